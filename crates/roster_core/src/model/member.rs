//! Member entity and its many-to-one association to `Team`.
//!
//! # Invariants
//! - `username` is never blank and `age` is never negative on persisted rows.
//! - A member may only reference a team that already has an id.
//! - `team` mirrors how the association was fetched: `Reference` when only
//!   the foreign key was read, `Loaded` when the query joined the team.

use super::base::Audit;
use super::team::{Team, TeamId};
use super::{ModelError, Persistable};
use serde::{Deserialize, Serialize};

pub type MemberId = i64;

/// Many-to-one association from a member to its team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRef {
    /// Only the foreign key is known; the team row was not fetched.
    Reference(TeamId),
    /// The team row was fetched together with the member.
    Loaded(Team),
}

impl TeamRef {
    pub fn id(&self) -> Option<TeamId> {
        match self {
            Self::Reference(id) => Some(*id),
            Self::Loaded(team) => team.id,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&Team> {
        match self {
            Self::Reference(_) => None,
            Self::Loaded(team) => Some(team),
        }
    }
}

// Association identity is the team id; fetch state does not matter.
impl PartialEq for TeamRef {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(left), Some(right)) => left == right,
            (None, None) => self.loaded() == other.loaded(),
            _ => false,
        }
    }
}

impl Eq for TeamRef {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<MemberId>,
    pub username: String,
    pub age: i32,
    pub team: Option<TeamRef>,
    pub audit: Audit,
}

impl Member {
    /// Creates an unsaved member with age `0` and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    pub fn with_age(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team: None,
            audit: Audit::default(),
        }
    }

    pub fn with_team(username: impl Into<String>, age: i32, team: &Team) -> Self {
        let mut member = Self::with_age(username, age);
        member.change_team(team);
        member
    }

    /// Points this member at `team`, replacing any previous association.
    pub fn change_team(&mut self, team: &Team) {
        self.team = Some(TeamRef::Loaded(team.clone()));
    }

    pub fn leave_team(&mut self) {
        self.team = None;
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team.as_ref().and_then(TeamRef::id)
    }

    /// Returns the team name when the association has been loaded.
    pub fn team_name(&self) -> Option<&str> {
        self.team
            .as_ref()
            .and_then(TeamRef::loaded)
            .map(|team| team.name.as_str())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.username.trim().is_empty() {
            return Err(ModelError::BlankUsername);
        }
        if self.age < 0 {
            return Err(ModelError::NegativeAge(self.age));
        }
        if let Some(TeamRef::Loaded(team)) = &self.team {
            if team.id.is_none() {
                return Err(ModelError::TransientTeam {
                    team_name: team.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Persistable for Member {
    type Id = MemberId;

    fn id(&self) -> Option<MemberId> {
        self.id
    }
}
