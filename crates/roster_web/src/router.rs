use crate::handlers::{health, members};
use crate::state::AppState;
use axum::{routing::get, Router};

/// Builds the full router over `state`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/members", get(members::list_members))
        .route("/members/{id}", get(members::find_member))
        .route("/members2/{id}", get(members::find_member_by_path))
        .with_state(state)
}
