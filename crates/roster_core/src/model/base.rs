//! Audit metadata embedded in entities.
//!
//! `TimeAudit` carries creation/modification timestamps only, `Audit` adds
//! the auditor that performed each write. Both are filled in by
//! [`crate::audit::Auditing`] inside repository writes; callers should treat
//! them as read-only.

use serde::{Deserialize, Serialize};

/// Creation and last-modification timestamps in epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAudit {
    pub created_date: Option<i64>,
    pub last_modified_date: Option<i64>,
}

/// Timestamps plus auditor identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(flatten)]
    pub time: TimeAudit,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Audit {
    pub fn created_date(&self) -> Option<i64> {
        self.time.created_date
    }

    pub fn last_modified_date(&self) -> Option<i64> {
        self.time.last_modified_date
    }
}
