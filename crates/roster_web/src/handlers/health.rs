//! Liveness probe.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use log::warn;
use roster_core::CrudRepository;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub members: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Reports the service version and whether the database answers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.with_members(|repo| repo.count()) {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: HealthStatus::Healthy,
                version: roster_core::core_version(),
                members: Some(count),
            }),
        ),
        Err(err) => {
            warn!(
                "event=health_check module=web status=error reason={}",
                err.message()
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: HealthStatus::Unhealthy,
                    version: roster_core::core_version(),
                    members: None,
                }),
            )
        }
    }
}
