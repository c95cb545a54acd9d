use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nestsite_core::error::NestError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error(transparent)]
    Nest(#[from] NestError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<nestsite_auth::AuthError> for ApiError {
    fn from(err: nestsite_auth::AuthError) -> Self {
        ApiError::Nest(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Nest(err) => match err {
                NestError::Validation { .. } => StatusCode::BAD_REQUEST,
                NestError::InvalidImport(_) => StatusCode::UNPROCESSABLE_ENTITY,
                NestError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
                NestError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
                NestError::NotFound { .. } => StatusCode::NOT_FOUND,
                NestError::AlreadyExists { .. } => StatusCode::CONFLICT,
                NestError::Database(_)
                | NestError::Storage(_)
                | NestError::Crypto(_)
                | NestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        let body = match self {
            ApiError::Nest(NestError::InvalidImport(issues)) => json!({
                "error": format!("Import rejected with {} issue(s)", issues.len()),
                "issues": issues,
            }),
            other if status.is_server_error() => {
                error!(error = %other, "Request failed");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
