//! Shared SQL fragments and the named query registry.

/// Member columns with stable aliases, lazy team.
macro_rules! member_select {
    () => {
        "SELECT
            m.member_id AS member_id,
            m.username AS username,
            m.age AS age,
            m.team_id AS team_id,
            m.created_date AS created_date,
            m.last_modified_date AS last_modified_date,
            m.created_by AS created_by,
            m.last_modified_by AS last_modified_by
        FROM member m"
    };
}

/// Member columns plus the left-joined team name.
macro_rules! member_team_select {
    () => {
        "SELECT
            m.member_id AS member_id,
            m.username AS username,
            m.age AS age,
            m.team_id AS team_id,
            m.created_date AS created_date,
            m.last_modified_date AS last_modified_date,
            m.created_by AS created_by,
            m.last_modified_by AS last_modified_by,
            t.name AS team_name
        FROM member m
        LEFT JOIN team t ON t.team_id = m.team_id"
    };
}

#[derive(Debug, Clone, Copy)]
struct NamedQuery {
    name: &'static str,
    sql: &'static str,
}

const NAMED_QUERIES: &[NamedQuery] = &[
    NamedQuery {
        name: "Member.findByUsername",
        sql: concat!(
            member_select!(),
            " WHERE m.username = ?1 ORDER BY m.member_id ASC"
        ),
    },
    NamedQuery {
        name: "Team.findByName",
        sql: "SELECT team_id, name FROM team WHERE name = ?1 ORDER BY team_id ASC",
    },
];

/// Returns the SQL registered under `name`, e.g. `Member.findByUsername`.
pub fn named_query(name: &str) -> Option<&'static str> {
    NAMED_QUERIES
        .iter()
        .find(|query| query.name == name)
        .map(|query| query.sql)
}
