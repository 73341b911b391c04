//! Error types for the store boundary and the HTTP boundary.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::error::ErrorKind as DbErrorKind;
use thiserror::Error;
use tracing::{error, warn};

use crate::state::AppState;

/// Failure reported by a [`UserStore`](crate::users::repo::UserStore).
///
/// Messages carry the driver text verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Single-row lookup matched nothing.
    #[error("record not found")]
    NotFound,

    /// Unique or foreign key constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// The store refused the value itself (not-null, check, overflow, bad encoding).
    #[error("{0}")]
    Invalid(String),

    /// Connectivity and everything else.
    #[error("{0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                DbErrorKind::UniqueViolation | DbErrorKind::ForeignKeyViolation => {
                    StoreError::Conflict(e.to_string())
                }
                DbErrorKind::NotNullViolation | DbErrorKind::CheckViolation => {
                    StoreError::Invalid(e.to_string())
                }
                // SQLSTATE class 22: data exception
                _ if db.code().is_some_and(|c| c.starts_with("22")) => {
                    StoreError::Invalid(e.to_string())
                }
                _ => StoreError::Internal(e.to_string()),
            },
            _ => StoreError::Internal(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How error kinds map onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatusMode {
    /// Every failure is a 400, matching the service's historical contract.
    #[default]
    Compat,
    /// 400 / 404 / 409 / 500 by kind.
    Typed,
}

/// Kind tag attached to rendered error responses so the status can be
/// rewritten per [`ErrorStatusMode`] after the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ApiErrorKind {
    pub fn status(self, mode: ErrorStatusMode) -> StatusCode {
        match mode {
            ErrorStatusMode::Compat => StatusCode::BAD_REQUEST,
            ErrorStatusMode::Typed => match self {
                ApiErrorKind::Validation => StatusCode::BAD_REQUEST,
                ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
                ApiErrorKind::Conflict => StatusCode::CONFLICT,
                ApiErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Error returned by handlers and extractors. Renders `{"error": msg}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unparsable path identity, query or body.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Validation(_) => ApiErrorKind::Validation,
            ApiError::NotFound(_) => ApiErrorKind::NotFound,
            ApiError::Conflict(_) => ApiErrorKind::Conflict,
            ApiError::Internal(_) => ApiErrorKind::Internal,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound(e.to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Invalid(msg) => ApiError::Validation(msg),
            StoreError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ApiErrorKind::Internal => error!(error = %self, "request failed"),
            _ => warn!(error = %self, ?kind, "request rejected"),
        }

        let mut res = (
            kind.status(ErrorStatusMode::Typed),
            Json(json!({ "error": self.to_string() })),
        )
            .into_response();
        res.extensions_mut().insert(kind);
        res
    }
}

/// Rewrites the status of error responses according to the configured mode.
pub async fn apply_error_status_mode(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    if let Some(kind) = res.extensions().get::<ApiErrorKind>().copied() {
        *res.status_mut() = kind.status(state.config.error_mode);
    }
    res
}

pub type ApiResult<T> = Result<T, ApiError>;
