//! Partial views of members returned instead of full entities.
//!
//! Every projection declares the select list it needs, so the query only
//! reads those columns. Column expressions may refer to `m` (member) and
//! `t` (team, left-joined).

use crate::model::dto::MemberDto;
use crate::model::member::MemberId;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A row shape that can be selected from `member m LEFT JOIN team t`.
pub trait Projection: Sized {
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Closed projection over `username`, with a derived `username age` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameOnly {
    username: String,
    age: i32,
}

impl UsernameOnly {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Open projection: computed from several entity fields.
    pub fn username_and_age(&self) -> String {
        format!("{} {}", self.username, self.age)
    }
}

impl Projection for UsernameOnly {
    const COLUMNS: &'static str = "m.username AS username, m.age AS age";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            age: row.get("age")?,
        })
    }
}

/// Class-based projection carrying only the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameOnlyDto {
    pub username: String,
}

impl UsernameOnlyDto {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl Projection for UsernameOnlyDto {
    const COLUMNS: &'static str = "m.username AS username";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self::new(row.get::<_, String>("username")?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
}

/// Username plus a nested view of the member's team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedClosedProjection {
    pub username: String,
    pub team: Option<TeamInfo>,
}

impl Projection for NestedClosedProjection {
    const COLUMNS: &'static str = "m.username AS username, t.name AS team_name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            team: row
                .get::<_, Option<String>>("team_name")?
                .map(|name| TeamInfo { name }),
        })
    }
}

/// Row shape of the native member/team projection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProjection {
    pub id: MemberId,
    pub username: String,
    pub team_name: Option<String>,
}

impl Projection for MemberProjection {
    const COLUMNS: &'static str = "m.member_id AS id, m.username AS username, t.name AS team_name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            team_name: row.get("team_name")?,
        })
    }
}

impl Projection for MemberDto {
    const COLUMNS: &'static str =
        "m.member_id AS member_id, m.username AS username, t.name AS team_name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self::new(
            Some(row.get("member_id")?),
            row.get::<_, String>("username")?,
            row.get("team_name")?,
        ))
    }
}
