//! Item entity with a client-assigned identifier.
//!
//! # Invariants
//! - `id` is chosen by the caller and never generated by the database.
//! - Newness cannot be derived from `id`, so it is derived from
//!   `audit.created_date`: an item that was never written has no
//!   creation timestamp.

use super::base::TimeAudit;
use super::{ModelError, Persistable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub audit: TimeAudit,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            audit: TimeAudit::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::BlankItemId);
        }
        Ok(())
    }
}

impl Persistable for Item {
    type Id = String;

    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn is_new(&self) -> bool {
        self.audit.created_date.is_none()
    }
}
