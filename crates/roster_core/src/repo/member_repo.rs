//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus every member query method: derived-style finders,
//!   named/explicit queries, paging and slicing, bulk updates, fetch plans,
//!   projections, native queries and Query-by-Example.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` validates before writing and stamps audit metadata only after
//!   the statement succeeded.
//! - Queries that join the team return `TeamRef::Loaded`; all others return
//!   `TeamRef::Reference`.
//! - Sort properties go through `MEMBER_SORT_COLUMNS`, never into SQL verbatim.

use crate::audit::Auditing;
use crate::model::base::{Audit, TimeAudit};
use crate::model::dto::MemberDto;
use crate::model::member::{Member, MemberId, TeamRef};
use crate::model::team::Team;
use crate::paging::{Page, PageRequest, Slice, Sort};
use crate::query_by_example::{Example, ExampleClause, Probe, ProbeField};
use crate::repo::projection::{
    MemberProjection, NestedClosedProjection, Projection, UsernameOnly, UsernameOnlyDto,
};
use crate::repo::team_repo::parse_team_row;
use crate::repo::{
    named_query, single_result, to_sql_int, CrudRepository, FetchPlan, QueryByExampleExecutor,
    ReadOnly, RepoError, RepoResult,
};
use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, Row};

/// Sortable member properties and the columns they map to.
const MEMBER_SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "m.member_id"),
    ("username", "m.username"),
    ("age", "m.age"),
    ("team.name", "t.name"),
    ("createdDate", "m.created_date"),
    ("lastModifiedDate", "m.last_modified_date"),
];

const MEMBER_TIEBREAK: &str = "m.member_id ASC";
const MEMBER_ALL_GRAPH: &str = "Member.all";

/// Hand-written queries that sit next to the generated-style finders.
pub trait MemberRepositoryCustom {
    fn find_member_custom(&self) -> RepoResult<Vec<Member>>;
}

/// Repository interface for member operations.
pub trait MemberRepository:
    CrudRepository<Member> + QueryByExampleExecutor<Member> + MemberRepositoryCustom
{
    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>>;

    /// First three members in id order.
    fn find_top3_hello_by(&self) -> RepoResult<Vec<Member>>;

    /// Runs the named query `Member.findByUsername`.
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;

    fn find_user(&self, username: &str, age: i32) -> RepoResult<Vec<Member>>;

    fn find_username_list(&self) -> RepoResult<Vec<String>>;

    /// Members that belong to a team, as DTOs (inner join).
    fn find_member_dto(&self) -> RepoResult<Vec<MemberDto>>;

    fn find_by_names(&self, names: &[String]) -> RepoResult<Vec<Member>>;

    /// Collection return: empty when nothing matches.
    fn find_list_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;

    /// Single return: `None` when nothing matches, error on several matches.
    fn find_member_by_username(&self, username: &str) -> RepoResult<Option<Member>>;

    /// Same contract as `find_member_by_username`.
    fn find_optional_by_username(&self, username: &str) -> RepoResult<Option<Member>>;

    /// Page of members of one age with a separate count query.
    fn find_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Page<Member>>;

    /// Slice of members of one age; never counts.
    fn find_slice_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Slice<Member>>;

    /// Offset/limit window ordered by username descending.
    fn find_paging_by_age(&self, age: i32, offset: u64, limit: u64) -> RepoResult<Vec<Member>>;

    fn total_count_by_age(&self, age: i32) -> RepoResult<u64>;

    /// Increments the age of every member at or above `age` and returns the
    /// number of rows changed.
    fn bulk_age_plus(&self, age: i32) -> RepoResult<usize>;

    fn find_member_fetch_join(&self) -> RepoResult<Vec<Member>>;

    fn find_member_entity_graph(&self) -> RepoResult<Vec<Member>>;

    fn find_entity_graph_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;

    /// Uses the `Member.all` named entity graph.
    fn find_named_entity_graph(&self) -> RepoResult<Vec<Member>>;

    fn find_read_only_by_username(&self, username: &str)
        -> RepoResult<Option<ReadOnly<Member>>>;

    fn find_projection_by_username(&self, username: &str) -> RepoResult<Vec<UsernameOnly>>;

    fn find_projection_dto_by_username(&self, username: &str)
        -> RepoResult<Vec<UsernameOnlyDto>>;

    fn find_nested_closed_projection_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<NestedClosedProjection>>;

    fn find_by_native_query(&self, username: &str) -> RepoResult<Option<Member>>;

    fn find_by_native_projection(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberProjection>>;

    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<Member>>;

    /// Replaces a `TeamRef::Reference` with the loaded team row.
    fn load_team(&self, member: &mut Member) -> RepoResult<()>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
    auditing: Auditing,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_auditing(conn, Auditing::default())
    }

    pub fn with_auditing(conn: &'conn Connection, auditing: Auditing) -> Self {
        Self { conn, auditing }
    }

    /// Projection of members with the given username, selecting only what
    /// `P` declares.
    pub fn find_dynamic_projection_by_username<P: Projection>(
        &self,
        username: &str,
    ) -> RepoResult<Vec<P>> {
        let sql = format!(
            "SELECT {} FROM member m
             LEFT JOIN team t ON t.team_id = m.team_id
             WHERE m.username = ?1
             ORDER BY m.member_id ASC;",
            P::COLUMNS
        );
        self.query_projection(&sql, [username])
    }

    fn query_members(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        plan: FetchPlan,
    ) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row, plan)?);
        }
        Ok(members)
    }

    fn query_projection<P: Projection>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<P>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| P::from_row(row))?;
        let mut items = Vec::new();
        for item in rows {
            items.push(item?);
        }
        Ok(items)
    }

    fn count_where(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<u64> {
        let count = self.conn.query_row(sql, params, |row| row.get::<_, i64>(0))?;
        Ok(count.unsigned_abs())
    }

    fn select_for(plan: FetchPlan) -> &'static str {
        match plan {
            FetchPlan::Lazy => member_select!(),
            FetchPlan::WithTeam => member_team_select!(),
        }
    }

    fn order_by(sort: &Sort) -> RepoResult<String> {
        Ok(sort.to_order_by(MEMBER_SORT_COLUMNS, MEMBER_TIEBREAK)?)
    }
}

impl CrudRepository<Member> for SqliteMemberRepository<'_> {
    fn save(&self, member: &mut Member) -> RepoResult<MemberId> {
        member.validate()?;
        let mut audit = member.audit.clone();
        let team_id = member.team_id();

        let id = match member.id {
            None => {
                self.auditing.on_create(&mut audit);
                self.conn.execute(
                    "INSERT INTO member (
                        username,
                        age,
                        team_id,
                        created_date,
                        last_modified_date,
                        created_by,
                        last_modified_by
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                    params![
                        member.username.as_str(),
                        member.age,
                        team_id,
                        audit.time.created_date,
                        audit.time.last_modified_date,
                        audit.created_by.as_deref(),
                        audit.last_modified_by.as_deref(),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                debug!("event=member_save module=repo status=ok op=insert member_id={id}");
                id
            }
            Some(id) => {
                self.auditing.on_update(&mut audit);
                let changed = self.conn.execute(
                    "UPDATE member
                     SET
                        username = ?1,
                        age = ?2,
                        team_id = ?3,
                        last_modified_date = ?4,
                        last_modified_by = ?5
                     WHERE member_id = ?6;",
                    params![
                        member.username.as_str(),
                        member.age,
                        team_id,
                        audit.time.last_modified_date,
                        audit.last_modified_by.as_deref(),
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "member",
                        id: id.to_string(),
                    });
                }
                debug!("event=member_save module=repo status=ok op=update member_id={id}");
                id
            }
        };

        member.id = Some(id);
        member.audit = audit;
        Ok(id)
    }

    fn find_by_id(&self, id: &MemberId) -> RepoResult<Option<Member>> {
        let members = self.query_members(
            concat!(member_select!(), " WHERE m.member_id = ?1;"),
            [id],
            FetchPlan::Lazy,
        )?;
        single_result(members)
    }

    /// Loads every member with its team (entity graph on `team`).
    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(member_team_select!(), " ORDER BY m.member_id ASC;"),
            [],
            FetchPlan::WithTeam,
        )
    }

    fn count(&self) -> RepoResult<u64> {
        self.count_where("SELECT COUNT(*) FROM member;", [])
    }

    fn delete_by_id(&self, id: &MemberId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM member WHERE member_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let changed = self.conn.execute("DELETE FROM member;", [])?;
        Ok(changed as u64)
    }
}

impl MemberRepositoryCustom for SqliteMemberRepository<'_> {
    fn find_member_custom(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(member_select!(), " ORDER BY m.member_id ASC;"),
            [],
            FetchPlan::Lazy,
        )
    }
}

impl Probe for Member {
    fn probe_fields(&self) -> Vec<ProbeField> {
        let mut fields = Vec::new();
        if let Some(id) = self.id {
            fields.push(ProbeField::integer("id", "m.member_id", id));
        }
        fields.push(ProbeField::text("username", "m.username", self.username.as_str()));
        fields.push(ProbeField::integer("age", "m.age", i64::from(self.age)));
        if let Some(team) = &self.team {
            if let Some(team_id) = team.id() {
                fields.push(ProbeField::integer("team.id", "m.team_id", team_id));
            }
            if let Some(loaded) = team.loaded() {
                fields.push(ProbeField::text("team.name", "t.name", loaded.name.as_str()));
            }
        }
        fields
    }
}

/// A probe that constrains the team only matches members that have one,
/// whichever match mode joins the individual predicates.
fn member_example_filter(clause: &ExampleClause) -> String {
    if clause.constrains_association("team") {
        format!("m.team_id IS NOT NULL AND {}", clause.sql)
    } else {
        clause.sql.clone()
    }
}

impl QueryByExampleExecutor<Member> for SqliteMemberRepository<'_> {
    fn find_all_by_example(&self, example: &Example<Member>) -> RepoResult<Vec<Member>> {
        let clause = example.to_clause();
        let sql = format!(
            "{} WHERE {} ORDER BY m.member_id ASC;",
            member_team_select!(),
            member_example_filter(&clause)
        );
        self.query_members(&sql, params_from_iter(clause.bind_values), FetchPlan::WithTeam)
    }

    fn find_one_by_example(&self, example: &Example<Member>) -> RepoResult<Option<Member>> {
        single_result(self.find_all_by_example(example)?)
    }

    fn count_by_example(&self, example: &Example<Member>) -> RepoResult<u64> {
        let clause = example.to_clause();
        let sql = format!(
            "SELECT COUNT(*) FROM member m
             LEFT JOIN team t ON t.team_id = m.team_id
             WHERE {};",
            member_example_filter(&clause)
        );
        self.count_where(&sql, params_from_iter(clause.bind_values))
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(
                member_select!(),
                " WHERE m.username = ?1 AND m.age > ?2 ORDER BY m.member_id ASC;"
            ),
            params![username, age],
            FetchPlan::Lazy,
        )
    }

    fn find_top3_hello_by(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(member_select!(), " ORDER BY m.member_id ASC LIMIT 3;"),
            [],
            FetchPlan::Lazy,
        )
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        let sql = named_query("Member.findByUsername").ok_or_else(|| {
            RepoError::InvalidData(
                "named query `Member.findByUsername` is not registered".to_string(),
            )
        })?;
        self.query_members(sql, [username], FetchPlan::Lazy)
    }

    fn find_user(&self, username: &str, age: i32) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(
                member_select!(),
                " WHERE m.username = ?1 AND m.age = ?2 ORDER BY m.member_id ASC;"
            ),
            params![username, age],
            FetchPlan::Lazy,
        )
    }

    fn find_username_list(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT m.username FROM member m ORDER BY m.member_id ASC;")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut usernames = Vec::new();
        for username in rows {
            usernames.push(username?);
        }
        Ok(usernames)
    }

    fn find_member_dto(&self) -> RepoResult<Vec<MemberDto>> {
        let sql = format!(
            "SELECT {} FROM member m
             INNER JOIN team t ON t.team_id = m.team_id
             ORDER BY m.member_id ASC;",
            <MemberDto as Projection>::COLUMNS
        );
        self.query_projection(&sql, [])
    }

    fn find_by_names(&self, names: &[String]) -> RepoResult<Vec<Member>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "{} WHERE m.username IN ({placeholders}) ORDER BY m.member_id ASC;",
            member_select!()
        );
        self.query_members(&sql, params_from_iter(names.iter()), FetchPlan::Lazy)
    }

    fn find_list_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(
                member_select!(),
                " WHERE m.username = ?1 ORDER BY m.member_id ASC;"
            ),
            [username],
            FetchPlan::Lazy,
        )
    }

    fn find_member_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        single_result(self.find_list_by_username(username)?)
    }

    fn find_optional_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        single_result(self.find_list_by_username(username)?)
    }

    fn find_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Page<Member>> {
        let sql = format!(
            "{} WHERE m.age = ?1 {} LIMIT ?2 OFFSET ?3;",
            member_team_select!(),
            Self::order_by(request.sort())?
        );
        let content = self.query_members(
            &sql,
            params![
                age,
                i64::from(request.size()),
                to_sql_int(request.offset())
            ],
            FetchPlan::Lazy,
        )?;
        Page::from_query(content, request, || self.total_count_by_age(age))
    }

    fn find_slice_by_age(&self, age: i32, request: &PageRequest) -> RepoResult<Slice<Member>> {
        let sql = format!(
            "{} WHERE m.age = ?1 {} LIMIT ?2 OFFSET ?3;",
            member_team_select!(),
            Self::order_by(request.sort())?
        );
        let content = self.query_members(
            &sql,
            params![
                age,
                i64::from(request.size()) + 1,
                to_sql_int(request.offset())
            ],
            FetchPlan::Lazy,
        )?;
        Ok(Slice::from_overfetch(content, request))
    }

    fn find_paging_by_age(&self, age: i32, offset: u64, limit: u64) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(
                member_select!(),
                " WHERE m.age = ?1 ORDER BY m.username DESC, m.member_id ASC LIMIT ?2 OFFSET ?3;"
            ),
            params![age, to_sql_int(limit), to_sql_int(offset)],
            FetchPlan::Lazy,
        )
    }

    fn total_count_by_age(&self, age: i32) -> RepoResult<u64> {
        self.count_where("SELECT COUNT(*) FROM member m WHERE m.age = ?1;", [age])
    }

    fn bulk_age_plus(&self, age: i32) -> RepoResult<usize> {
        let mut audit = Audit::default();
        self.auditing.on_update(&mut audit);
        let changed = self.conn.execute(
            "UPDATE member
             SET
                age = age + 1,
                last_modified_date = ?2,
                last_modified_by = ?3
             WHERE age >= ?1;",
            params![
                age,
                audit.time.last_modified_date,
                audit.last_modified_by.as_deref()
            ],
        )?;
        info!("event=member_bulk_update module=repo status=ok threshold={age} affected={changed}");
        Ok(changed)
    }

    fn find_member_fetch_join(&self) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(member_team_select!(), " ORDER BY m.member_id ASC;"),
            [],
            FetchPlan::WithTeam,
        )
    }

    fn find_member_entity_graph(&self) -> RepoResult<Vec<Member>> {
        self.find_member_fetch_join()
    }

    fn find_entity_graph_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.query_members(
            concat!(
                member_team_select!(),
                " WHERE m.username = ?1 ORDER BY m.member_id ASC;"
            ),
            [username],
            FetchPlan::WithTeam,
        )
    }

    fn find_named_entity_graph(&self) -> RepoResult<Vec<Member>> {
        let plan = FetchPlan::named(MEMBER_ALL_GRAPH).ok_or_else(|| {
            RepoError::InvalidData(format!("entity graph `{MEMBER_ALL_GRAPH}` is not registered"))
        })?;
        let sql = format!("{} ORDER BY m.member_id ASC;", Self::select_for(plan));
        self.query_members(&sql, [], plan)
    }

    fn find_read_only_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Option<ReadOnly<Member>>> {
        Ok(self
            .find_member_by_username(username)?
            .map(ReadOnly::new))
    }

    fn find_projection_by_username(&self, username: &str) -> RepoResult<Vec<UsernameOnly>> {
        self.find_dynamic_projection_by_username(username)
    }

    fn find_projection_dto_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<UsernameOnlyDto>> {
        self.find_dynamic_projection_by_username(username)
    }

    fn find_nested_closed_projection_by_username(
        &self,
        username: &str,
    ) -> RepoResult<Vec<NestedClosedProjection>> {
        self.find_dynamic_projection_by_username(username)
    }

    fn find_by_native_query(&self, username: &str) -> RepoResult<Option<Member>> {
        let members = self.query_members(
            "SELECT * FROM member WHERE username = ?1 ORDER BY member_id ASC;",
            [username],
            FetchPlan::Lazy,
        )?;
        single_result(members)
    }

    fn find_by_native_projection(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<MemberProjection>> {
        let sql = format!(
            "SELECT {} FROM member m
             LEFT JOIN team t ON t.team_id = m.team_id
             {}
             LIMIT ?1 OFFSET ?2;",
            MemberProjection::COLUMNS,
            Self::order_by(request.sort())?
        );
        let content = self.query_projection(
            &sql,
            params![i64::from(request.size()), to_sql_int(request.offset())],
        )?;
        Page::from_query(content, request, || {
            self.count_where("SELECT COUNT(*) FROM member;", [])
        })
    }

    fn find_all_paged(&self, request: &PageRequest) -> RepoResult<Page<Member>> {
        let sql = format!(
            "{} {} LIMIT ?1 OFFSET ?2;",
            member_team_select!(),
            Self::order_by(request.sort())?
        );
        let content = self.query_members(
            &sql,
            params![i64::from(request.size()), to_sql_int(request.offset())],
            FetchPlan::WithTeam,
        )?;
        Page::from_query(content, request, || self.count())
    }

    fn load_team(&self, member: &mut Member) -> RepoResult<()> {
        let Some(TeamRef::Reference(team_id)) = member.team else {
            return Ok(());
        };
        let mut stmt = self
            .conn
            .prepare("SELECT team_id, name FROM team WHERE team_id = ?1;")?;
        let mut rows = stmt.query([team_id])?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::NotFound {
                entity: "team",
                id: team_id.to_string(),
            });
        };
        member.team = Some(TeamRef::Loaded(parse_team_row(row)?));
        Ok(())
    }
}

/// Parses a member row selected with `member_select!`/`member_team_select!`
/// or `SELECT *` from `member`.
pub(crate) fn parse_member_row(row: &Row<'_>, plan: FetchPlan) -> RepoResult<Member> {
    let team_id: Option<i64> = row.get("team_id")?;
    let team = match (team_id, plan) {
        (None, _) => None,
        (Some(id), FetchPlan::Lazy) => Some(TeamRef::Reference(id)),
        (Some(id), FetchPlan::WithTeam) => {
            let name: Option<String> = row.get("team_name")?;
            let name = name.ok_or_else(|| {
                RepoError::InvalidData(format!("member references missing team {id}"))
            })?;
            Some(TeamRef::Loaded(Team { id: Some(id), name }))
        }
    };

    let member = Member {
        id: Some(row.get("member_id")?),
        username: row.get("username")?,
        age: row.get("age")?,
        team,
        audit: Audit {
            time: TimeAudit {
                created_date: row.get("created_date")?,
                last_modified_date: row.get("last_modified_date")?,
            },
            created_by: row.get("created_by")?,
            last_modified_by: row.get("last_modified_by")?,
        },
    };
    member.validate().map_err(|err| {
        RepoError::InvalidData(format!("member {:?} failed validation: {err}", member.id))
    })?;
    Ok(member)
}
