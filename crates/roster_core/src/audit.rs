//! Auditing of entity writes.
//!
//! # Responsibility
//! - Resolve "who" performs a write (`AuditorAware`) and "when" (`Clock`).
//! - Stamp `Audit` / `TimeAudit` on create and update.
//!
//! # Invariants
//! - Creation stamps set both created and last-modified fields to the same
//!   instant and auditor.
//! - Update stamps never touch the created fields.

use crate::model::base::{Audit, TimeAudit};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Supplies the identity recorded in `created_by` / `last_modified_by`.
pub trait AuditorAware: Send + Sync {
    fn current_auditor(&self) -> Option<String>;
}

/// Supplies the timestamp recorded in audit dates.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Auditor that returns a fresh random UUID for every write.
///
/// Stands in for a real session user in this reference project.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuidAuditor;

impl AuditorAware for RandomUuidAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}

/// Auditor that always reports the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedAuditor(pub String);

impl FixedAuditor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl AuditorAware for FixedAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Auditor + clock pair shared by repositories.
#[derive(Clone)]
pub struct Auditing {
    auditor: Arc<dyn AuditorAware>,
    clock: Arc<dyn Clock>,
}

impl Auditing {
    pub fn new(auditor: impl AuditorAware + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            auditor: Arc::new(auditor),
            clock: Arc::new(clock),
        }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn current_auditor(&self) -> Option<String> {
        self.auditor.current_auditor()
    }

    pub fn on_create(&self, audit: &mut Audit) {
        self.on_create_time(&mut audit.time);
        let auditor = self.current_auditor();
        audit.created_by = auditor.clone();
        audit.last_modified_by = auditor;
    }

    pub fn on_update(&self, audit: &mut Audit) {
        self.on_update_time(&mut audit.time);
        audit.last_modified_by = self.current_auditor();
    }

    pub fn on_create_time(&self, audit: &mut TimeAudit) {
        let now = self.now_millis();
        audit.created_date = Some(now);
        audit.last_modified_date = Some(now);
    }

    pub fn on_update_time(&self, audit: &mut TimeAudit) {
        audit.last_modified_date = Some(self.now_millis());
    }
}

impl Default for Auditing {
    fn default() -> Self {
        Self::new(RandomUuidAuditor, SystemClock)
    }
}

impl Debug for Auditing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditing").finish_non_exhaustive()
    }
}
