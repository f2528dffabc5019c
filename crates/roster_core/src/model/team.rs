//! Team entity.

use super::{ModelError, Persistable};
use serde::{Deserialize, Serialize};

pub type TeamId = i64;

/// A named group of members.
///
/// The member side owns the association (`member.team_id`); the list of
/// members of a team is a repository query, see
/// [`crate::repo::team_repo::TeamRepository::find_members`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<TeamId>,
    pub name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::BlankTeamName);
        }
        Ok(())
    }
}

impl Persistable for Team {
    type Id = TeamId;

    fn id(&self) -> Option<TeamId> {
        self.id
    }
}
