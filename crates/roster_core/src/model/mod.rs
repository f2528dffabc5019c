//! Domain model for members, teams and items.
//!
//! # Responsibility
//! - Define the persisted entity shapes and their validation rules.
//! - Define the `Persistable` contract that drives insert-vs-update on save.
//!
//! # Invariants
//! - Generated identifiers (`MemberId`, `TeamId`) are `None` until first save.
//! - Client-assigned identifiers (`Item`) decide newness from audit state.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod base;
pub mod dto;
pub mod item;
pub mod member;
pub mod team;

/// Identity and lifecycle contract used by repository `save` dispatch.
pub trait Persistable {
    type Id: Clone + Display;

    /// Returns the entity identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;

    /// Returns whether `save` must insert instead of update.
    ///
    /// Entities with generated identifiers are new until the database hands
    /// one out. Entities with client-assigned identifiers override this.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}

/// Validation failure raised before any SQL mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    BlankUsername,
    NegativeAge(i32),
    BlankTeamName,
    BlankItemId,
    /// The member points at a team that has not been saved yet.
    TransientTeam { team_name: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "member username must not be blank"),
            Self::NegativeAge(age) => write!(f, "member age must not be negative, got {age}"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
            Self::BlankItemId => write!(f, "item id must not be blank"),
            Self::TransientTeam { team_name } => write!(
                f,
                "team `{team_name}` must be saved before a member can reference it"
            ),
        }
    }
}

impl Error for ModelError {}
