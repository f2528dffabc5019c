//! Team repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Team names are validated before insert/update.
//! - Deleting a team that still has members fails on the foreign key;
//!   members must be moved or removed first.

use crate::model::member::Member;
use crate::model::team::{Team, TeamId};
use crate::repo::member_repo::parse_member_row;
use crate::repo::{named_query, CrudRepository, FetchPlan, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row};

const TEAM_SELECT_SQL: &str = "SELECT team_id, name FROM team";

/// Repository interface for team operations.
pub trait TeamRepository: CrudRepository<Team> {
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>>;
    /// Members of one team, ordered by id, with lazy team references.
    fn find_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_teams(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }
}

impl CrudRepository<Team> for SqliteTeamRepository<'_> {
    fn save(&self, team: &mut Team) -> RepoResult<TeamId> {
        team.validate()?;

        match team.id {
            None => {
                self.conn.execute(
                    "INSERT INTO team (name) VALUES (?1);",
                    [team.name.as_str()],
                )?;
                let id = self.conn.last_insert_rowid();
                team.id = Some(id);
                debug!("event=team_save module=repo status=ok op=insert team_id={id}");
                Ok(id)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE team SET name = ?1 WHERE team_id = ?2;",
                    params![team.name.as_str(), id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "team",
                        id: id.to_string(),
                    });
                }
                debug!("event=team_save module=repo status=ok op=update team_id={id}");
                Ok(id)
            }
        }
    }

    fn find_by_id(&self, id: &TeamId) -> RepoResult<Option<Team>> {
        let mut teams =
            self.query_teams(&format!("{TEAM_SELECT_SQL} WHERE team_id = ?1;"), [id])?;
        Ok(teams.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        self.query_teams(&format!("{TEAM_SELECT_SQL} ORDER BY team_id ASC;"), [])
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM team;", [], |row| row.get::<_, i64>(0))?;
        Ok(count.unsigned_abs())
    }

    fn delete_by_id(&self, id: &TeamId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM team WHERE team_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let changed = self.conn.execute("DELETE FROM team;", [])?;
        Ok(changed as u64)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>> {
        let sql = named_query("Team.findByName").ok_or_else(|| {
            RepoError::InvalidData("named query `Team.findByName` is not registered".to_string())
        })?;
        self.query_teams(sql, [name])
    }

    fn find_members(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(concat!(
            member_select!(),
            " WHERE m.team_id = ?1 ORDER BY m.member_id ASC;"
        ))?;
        let mut rows = stmt.query([team_id])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row, FetchPlan::Lazy)?);
        }
        Ok(members)
    }
}

pub(crate) fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let team = Team {
        id: Some(row.get("team_id")?),
        name: row.get("name")?,
    };
    if team.validate().is_err() {
        return Err(RepoError::InvalidData(format!(
            "blank team name in team.name for team_id {:?}",
            team.id
        )));
    }
    Ok(team)
}
