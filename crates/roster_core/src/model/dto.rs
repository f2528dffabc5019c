//! Read-only transfer shapes built from members.

use super::member::{Member, MemberId};
use serde::{Deserialize, Serialize};

/// Member summary with the name of its team, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: Option<MemberId>,
    pub username: String,
    pub team_name: Option<String>,
}

impl MemberDto {
    pub fn new(id: Option<MemberId>, username: impl Into<String>, team_name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            team_name,
        }
    }
}

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            team_name: member.team_name().map(str::to_string),
        }
    }
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self::from(&member)
    }
}
