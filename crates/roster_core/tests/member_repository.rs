use roster_core::db::open_db_in_memory;
use roster_core::{
    Auditing, CrudRepository, Direction, FixedAuditor, FixedClock, Member, MemberRepository,
    MemberRepositoryCustom, PageRequest, RepoError, Sort, SqliteMemberRepository,
    SqliteTeamRepository, Team, TeamRef,
};
use rusqlite::Connection;

fn save_all(repo: &SqliteMemberRepository<'_>, members: &mut [Member]) {
    for member in members.iter_mut() {
        repo.save(member).unwrap();
    }
}

fn save_team(conn: &Connection, name: &str) -> Team {
    let mut team = Team::new(name);
    SqliteTeamRepository::new(conn).save(&mut team).unwrap();
    team
}

fn five_members_aged_ten(repo: &SqliteMemberRepository<'_>) {
    let mut members: Vec<Member> = (1..=5)
        .map(|index| Member::with_age(format!("member{index}"), 10))
        .collect();
    save_all(repo, &mut members);
}

#[test]
fn save_then_find_returns_equal_member() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);

    let mut member = Member::new("memberA");
    let id = repo.save(&mut member).unwrap();

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.id, member.id);
    assert_eq!(found.username, member.username);
    assert_eq!(found, member);
}

#[test]
fn basic_crud() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);

    let mut member1 = Member::new("member1");
    let mut member2 = Member::new("member2");
    repo.save(&mut member1).unwrap();
    repo.save(&mut member2).unwrap();

    assert_eq!(repo.find_by_id(&member1.id.unwrap()).unwrap().unwrap(), member1);
    assert_eq!(repo.find_by_id(&member2.id.unwrap()).unwrap().unwrap(), member2);
    assert_eq!(repo.find_all().unwrap().len(), 2);
    assert_eq!(repo.count().unwrap(), 2);

    assert!(repo.delete(&member1).unwrap());
    assert!(repo.delete(&member2).unwrap());
    assert_eq!(repo.count().unwrap(), 0);
    assert!(!repo.delete(&member1).unwrap());
}

#[test]
fn save_stamps_audit_on_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let creator = SqliteMemberRepository::with_auditing(
        &conn,
        Auditing::new(FixedAuditor::new("creator"), FixedClock(100)),
    );
    let mut member = Member::with_age("audited", 30);
    creator.save(&mut member).unwrap();
    assert_eq!(member.audit.created_date(), Some(100));
    assert_eq!(member.audit.created_by.as_deref(), Some("creator"));

    let editor = SqliteMemberRepository::with_auditing(
        &conn,
        Auditing::new(FixedAuditor::new("editor"), FixedClock(200)),
    );
    member.age = 31;
    editor.save(&mut member).unwrap();

    let loaded = editor.find_by_id(&member.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.age, 31);
    assert_eq!(loaded.audit.created_date(), Some(100));
    assert_eq!(loaded.audit.created_by.as_deref(), Some("creator"));
    assert_eq!(loaded.audit.last_modified_date(), Some(200));
    assert_eq!(loaded.audit.last_modified_by.as_deref(), Some("editor"));
}

#[test]
fn updating_a_missing_member_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let mut ghost = Member::new("ghost");
    ghost.id = Some(42);

    let err = repo.save(&mut ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "member", .. }));
}

#[test]
fn saving_member_with_unsaved_team_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let mut member = Member::with_team("m1", 10, &Team::new("transient"));

    let err = repo.save(&mut member).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(member.id, None);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn find_by_username_and_age_greater_than() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [Member::with_age("AAA", 10), Member::with_age("AAA", 20)],
    );

    let result = repo.find_by_username_and_age_greater_than("AAA", 15).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].username, "AAA");
    assert_eq!(result[0].age, 20);
}

#[test]
fn find_top3_hello_by_limits_to_three() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [
            Member::with_age("AAA", 10),
            Member::with_age("BBB", 20),
            Member::with_age("CCC", 30),
            Member::with_age("DDD", 40),
        ],
    );

    let top3 = repo.find_top3_hello_by().unwrap();
    let names: Vec<&str> = top3.iter().map(|member| member.username.as_str()).collect();
    assert_eq!(names, vec!["AAA", "BBB", "CCC"]);
}

#[test]
fn named_and_explicit_queries() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let mut member_a = Member::with_age("memberA", 10);
    let mut member_b = Member::with_age("memberB", 20);
    repo.save(&mut member_a).unwrap();
    repo.save(&mut member_b).unwrap();

    assert_eq!(repo.find_by_username("memberA").unwrap(), vec![member_a.clone()]);
    assert_eq!(repo.find_user("memberA", 10).unwrap(), vec![member_a]);
    assert!(repo.find_user("memberA", 20).unwrap().is_empty());
    assert_eq!(
        repo.find_username_list().unwrap(),
        vec!["memberA".to_string(), "memberB".to_string()]
    );
}

#[test]
fn find_member_dto_joins_team() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let mut member = Member::with_age("AAA", 10);
    repo.save(&mut member).unwrap();
    save_all(&repo, &mut [Member::with_age("no-team", 5)]);

    let team_a = save_team(&conn, "teamA");
    member.change_team(&team_a);
    repo.save(&mut member).unwrap();

    let dtos = repo.find_member_dto().unwrap();
    assert_eq!(dtos.len(), 1);
    assert_eq!(dtos[0].id, member.id);
    assert_eq!(dtos[0].username, "AAA");
    assert_eq!(dtos[0].team_name.as_deref(), Some("teamA"));
}

#[test]
fn find_by_names_uses_in_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [
            Member::with_age("AAA", 10),
            Member::with_age("BBB", 20),
            Member::with_age("CCC", 30),
        ],
    );

    let found = repo
        .find_by_names(&["AAA".to_string(), "CCC".to_string()])
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(repo.find_by_names(&[]).unwrap().is_empty());
}

#[test]
fn return_type_variants() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [
            Member::with_age("AAA", 10),
            Member::with_age("BBB", 20),
            Member::with_age("BBB", 30),
        ],
    );

    assert_eq!(repo.find_list_by_username("AAA").unwrap().len(), 1);
    assert!(repo.find_list_by_username("difekj").unwrap().is_empty());

    assert_eq!(
        repo.find_member_by_username("AAA").unwrap().unwrap().age,
        10
    );
    assert!(repo.find_member_by_username("akdfjeij").unwrap().is_none());
    assert!(repo.find_optional_by_username("akdfjeij").unwrap().is_none());

    let err = repo.find_member_by_username("BBB").unwrap_err();
    assert!(matches!(
        err,
        RepoError::IncorrectResultSize {
            expected: 1,
            actual: 2
        }
    ));
    assert!(repo.find_optional_by_username("BBB").is_err());
}

#[test]
fn paging_by_age_with_sort() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    five_members_aged_ten(&repo);

    let request = PageRequest::of_sorted(0, 3, Sort::by(Direction::Desc, &["username"])).unwrap();
    let page = repo.find_by_age(10, &request).unwrap();

    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.content().len(), 3);
    assert_eq!(page.number(), 0);
    assert_eq!(page.total_pages(), 2);
    assert!(page.is_first());
    assert!(page.has_next());
    assert_eq!(page.content()[0].username, "member5");

    let dto_page = page.map(|member| roster_core::MemberDto::new(member.id, member.username, None));
    assert_eq!(dto_page.content()[2].username, "member3");

    let last = repo.find_by_age(10, &request.next()).unwrap();
    assert_eq!(last.content().len(), 2);
    assert!(last.is_last());
}

#[test]
fn paging_rejects_unknown_sort_property() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let request = PageRequest::of_sorted(0, 3, Sort::by(Direction::Asc, &["password"])).unwrap();

    let err = repo.find_by_age(10, &request).unwrap_err();
    assert!(matches!(err, RepoError::InvalidSort(property) if property == "password"));
}

#[test]
fn slicing_by_age() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    five_members_aged_ten(&repo);

    let request = PageRequest::of_sorted(0, 3, Sort::by(Direction::Desc, &["username"])).unwrap();
    let slice = repo.find_slice_by_age(10, &request).unwrap();
    assert_eq!(slice.content().len(), 3);
    assert_eq!(slice.number(), 0);
    assert!(slice.has_next());
    assert!(slice.is_first());

    let rest = repo.find_slice_by_age(10, &request.next()).unwrap();
    assert_eq!(rest.content().len(), 2);
    assert!(!rest.has_next());
}

#[test]
fn offset_limit_paging_and_total_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    five_members_aged_ten(&repo);

    let result = repo.find_paging_by_age(10, 0, 3).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0].username, "member5");
    assert_eq!(repo.total_count_by_age(10).unwrap(), 5);
}

#[test]
fn bulk_update_increments_matching_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [
            Member::with_age("member1", 10),
            Member::with_age("member2", 19),
            Member::with_age("member3", 20),
            Member::with_age("member4", 30),
            Member::with_age("member5", 40),
        ],
    );

    assert_eq!(repo.bulk_age_plus(20).unwrap(), 3);

    let member5 = repo.find_by_username("member5").unwrap();
    assert_eq!(member5[0].age, 41);
    let member2 = repo.find_by_username("member2").unwrap();
    assert_eq!(member2[0].age, 19);
}

#[test]
fn fetch_plans_load_team_eagerly_or_lazily() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let team_a = save_team(&conn, "teamA");
    let team_b = save_team(&conn, "teamB");
    save_all(
        &repo,
        &mut [
            Member::with_team("member1", 10, &team_a),
            Member::with_team("member2", 20, &team_b),
        ],
    );

    let lazy = repo.find_by_username("member1").unwrap();
    assert!(matches!(lazy[0].team, Some(TeamRef::Reference(_))));
    assert_eq!(lazy[0].team_name(), None);

    for members in [
        repo.find_member_fetch_join().unwrap(),
        repo.find_member_entity_graph().unwrap(),
        repo.find_named_entity_graph().unwrap(),
        repo.find_all().unwrap(),
    ] {
        let names: Vec<Option<&str>> = members.iter().map(Member::team_name).collect();
        assert_eq!(names, vec![Some("teamA"), Some("teamB")]);
    }

    let by_name = repo.find_entity_graph_by_username("member2").unwrap();
    assert_eq!(by_name[0].team_name(), Some("teamB"));
}

#[test]
fn load_team_resolves_reference() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let team_a = save_team(&conn, "teamA");
    let mut member = Member::with_team("member1", 10, &team_a);
    repo.save(&mut member).unwrap();

    let mut loaded = repo.find_by_id(&member.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.team_name(), None);
    repo.load_team(&mut loaded).unwrap();
    assert_eq!(loaded.team_name(), Some("teamA"));
}

#[test]
fn read_only_result_is_written_only_after_detaching() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(&repo, &mut [Member::with_age("member1", 10)]);

    let read_only = repo.find_read_only_by_username("member1").unwrap().unwrap();
    let id = read_only.id.unwrap();
    assert_eq!(read_only.username, "member1");

    let mut detached = read_only.clone().into_detached();
    detached.username = "member2".to_string();
    assert_eq!(read_only.username, "member1");
    assert_eq!(repo.find_by_id(&id).unwrap().unwrap().username, "member1");

    repo.save(&mut detached).unwrap();
    assert_eq!(repo.find_by_id(&id).unwrap().unwrap().username, "member2");
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn bulk_update_at_age_limit_fails_without_partial_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [Member::with_age("young", 20), Member::with_age("old", i32::MAX)],
    );

    let err = repo.bulk_age_plus(0).unwrap_err();
    assert!(err.to_string().contains("CHECK constraint failed"));

    let ages: Vec<(String, i32)> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|member| (member.username, member.age))
        .collect();
    assert_eq!(
        ages,
        vec![("young".to_string(), 20), ("old".to_string(), i32::MAX)]
    );
}

#[test]
fn custom_fragment_query() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    save_all(
        &repo,
        &mut [Member::with_age("member1", 10), Member::with_age("member2", 20)],
    );

    assert_eq!(repo.find_member_custom().unwrap().len(), 2);
}

#[test]
fn native_query_and_native_projection_page() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::new(&conn);
    let team_a = save_team(&conn, "teamA");
    save_all(
        &repo,
        &mut [
            Member::with_team("m1", 10, &team_a),
            Member::with_team("m2", 10, &team_a),
        ],
    );

    let m1 = repo.find_by_native_query("m1").unwrap().unwrap();
    assert_eq!(m1.username, "m1");
    assert_eq!(m1.age, 10);

    let page = repo
        .find_by_native_projection(&PageRequest::of(0, 3).unwrap())
        .unwrap();
    assert_eq!(page.size(), 3);
    assert_eq!(page.number(), 0);
    assert_eq!(page.number_of_elements(), 2);
    assert_eq!(page.content()[0].team_name.as_deref(), Some("teamA"));
}
