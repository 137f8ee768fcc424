//! # HTTP API Errors
//!
//! Maps catalog errors and request rejections onto status codes and the
//! `{ "error": <message> }` body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body or query string could not be used
    #[error("{0}")]
    BadRequest(String),

    /// Path names nothing (e.g. an id that is not a UUID)
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Catalog call could not run to completion (e.g. the task panicked)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Catalog(err) => match err {
                // 400 Bad Request
                CatalogError::Validation(_)
                | CatalogError::ProtectedColumn(_)
                | CatalogError::MissingColumnName
                | CatalogError::ColumnExists(_)
                | CatalogError::InvalidPagination(_) => StatusCode::BAD_REQUEST,

                // 404 Not Found
                CatalogError::TableNotFound(_) | CatalogError::ColumnNotFound(_) => {
                    StatusCode::NOT_FOUND
                }

                // 409 Conflict
                CatalogError::Conflict { .. } => StatusCode::CONFLICT,

                // 500 Internal Server Error
                CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor whose rejections use the API error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
