//! HTTP surface for the roster service.
//!
//! Read-only member endpoints plus a health probe, served by axum over the
//! shared SQLite connection held in [`AppState`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiErrorType};
pub use extract::{MemberPath, Pageable, DEFAULT_PAGE_SIZE};
pub use router::create_router;
pub use state::AppState;
