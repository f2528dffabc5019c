use roster_core::db::open_db_in_memory;
use roster_core::{
    CrudRepository, Member, SqliteMemberRepository, SqliteTeamRepository, Team, TeamRef,
    TeamRepository,
};

#[test]
fn team_crud_and_name_lookup() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::new(&conn);

    let mut team_a = Team::new("teamA");
    let mut team_b = Team::new("teamB");
    repo.save(&mut team_a).unwrap();
    repo.save(&mut team_b).unwrap();
    assert_eq!(repo.count().unwrap(), 2);

    team_b.name = "teamC".to_string();
    repo.save(&mut team_b).unwrap();
    assert!(repo.find_by_name("teamB").unwrap().is_empty());
    assert_eq!(repo.find_by_name("teamC").unwrap(), vec![team_b.clone()]);

    assert!(repo.delete(&team_b).unwrap());
    assert_eq!(repo.find_all().unwrap(), vec![team_a]);
}

#[test]
fn find_members_returns_lazy_references() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::new(&conn);
    let members = SqliteMemberRepository::new(&conn);

    let mut team_a = Team::new("teamA");
    teams.save(&mut team_a).unwrap();
    let team_id = team_a.id.unwrap();
    members.save(&mut Member::with_team("member1", 10, &team_a)).unwrap();
    members.save(&mut Member::with_team("member2", 20, &team_a)).unwrap();
    members.save(&mut Member::with_age("loner", 30)).unwrap();

    let roster = teams.find_members(team_id).unwrap();
    assert_eq!(roster.len(), 2);
    assert!(roster
        .iter()
        .all(|member| matches!(member.team, Some(TeamRef::Reference(id)) if id == team_id)));
}

#[test]
fn deleting_team_with_members_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::new(&conn);
    let members = SqliteMemberRepository::new(&conn);

    let mut team_a = Team::new("teamA");
    teams.save(&mut team_a).unwrap();
    members.save(&mut Member::with_team("member1", 10, &team_a)).unwrap();

    assert!(teams.delete(&team_a).is_err());
    assert_eq!(teams.count().unwrap(), 1);
}
