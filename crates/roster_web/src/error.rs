//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use roster_core::{PagingError, RepoError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Body of every error response: `{"error": {"message", "type"}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn message(&self) -> &str {
        &self.response.error.message
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match &err {
            RepoError::NotFound { .. } => Self::not_found(err.to_string()),
            RepoError::Validation(_) | RepoError::InvalidSort(_) => {
                warn!("event=request_rejected module=web status=error reason={err}");
                Self::bad_request(err.to_string())
            }
            RepoError::Db(_) | RepoError::IncorrectResultSize { .. } | RepoError::InvalidData(_) => {
                error!("event=request_failed module=web status=error reason={err}");
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<PagingError> for ApiError {
    fn from(err: PagingError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, ApiErrorType};
    use axum::http::StatusCode;
    use roster_core::{ModelError, PagingError, RepoError};

    #[test]
    fn repo_errors_map_to_status_codes() {
        let not_found = ApiError::from(RepoError::NotFound {
            entity: "member",
            id: "7".to_string(),
        });
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.message(), "member not found: 7");

        let invalid = ApiError::from(RepoError::Validation(ModelError::BlankUsername));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let sort = ApiError::from(RepoError::InvalidSort("password".to_string()));
        assert_eq!(sort.response.error.error_type, ApiErrorType::InvalidRequestError);

        let data = ApiError::from(RepoError::InvalidData("broken".to_string()));
        assert_eq!(data.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn paging_errors_are_bad_requests() {
        let err = ApiError::from(PagingError::InvalidSize(0));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn body_uses_type_key() {
        let err = ApiError::not_found("gone");
        let json = serde_json::to_value(&err.response).unwrap();
        assert_eq!(json["error"]["type"], "not_found_error");
        assert_eq!(json["error"]["message"], "gone");
    }
}
