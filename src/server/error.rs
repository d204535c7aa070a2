//! The one error envelope every endpoint answers with on failure.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

const BAD_REQUEST_MESSAGE: &str = "received bad request... request not processed...";
const NOT_FOUND_MESSAGE: &str = "endpoint not found";
const METHOD_NOT_ALLOWED_MESSAGE: &str = "method not allowed... request not processed";
const UNPROCESSABLE_MESSAGE: &str = "unprocessable entity detected... entity not processed";
const INTERNAL_MESSAGE: &str = "internal server error... request not processed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or ambiguous request shape
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Referenced resource, page or route does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    /// Well-formed input that refers to something unknown
    #[error("unprocessable entity: {0}")]
    Unprocessable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: u16,
    pub message: &'static str,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        let status = err.status_code();
        let message = match status {
            StatusCode::BAD_REQUEST => BAD_REQUEST_MESSAGE,
            StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE,
            StatusCode::METHOD_NOT_ALLOWED => METHOD_NOT_ALLOWED_MESSAGE,
            StatusCode::UNPROCESSABLE_ENTITY => UNPROCESSABLE_MESSAGE,
            _ => INTERNAL_MESSAGE,
        };
        Self {
            status: "error",
            error: status.as_u16(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::info!("Request rejected: {self}");
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// A path segment that does not parse means no route matched.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::NotFound(rejection.body_text())
    }
}
