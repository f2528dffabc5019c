//! Application state shared by every handler.

use crate::error::ApiError;
use log::error;
use roster_core::{Auditing, RepoResult, SqliteMemberRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// One SQLite connection behind a mutex plus the auditing used for writes.
///
/// The lock is taken inside synchronous closures only, so no guard ever
/// lives across an `.await`.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    auditing: Auditing,
}

impl AppState {
    pub fn new(conn: Connection, auditing: Auditing) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            auditing,
        }
    }

    /// Runs `f` against the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> Result<T, ApiError> {
        let guard = self.conn.lock().map_err(|_| {
            error!("event=db_lock module=web status=error reason=poisoned");
            ApiError::internal("database connection is unavailable")
        })?;
        f(&guard).map_err(ApiError::from)
    }

    /// Runs `f` against a member repository bound to the shared connection.
    pub fn with_members<T>(
        &self,
        f: impl FnOnce(SqliteMemberRepository<'_>) -> RepoResult<T>,
    ) -> Result<T, ApiError> {
        let auditing = self.auditing.clone();
        self.with_conn(|conn| f(SqliteMemberRepository::with_auditing(conn, auditing)))
    }
}
