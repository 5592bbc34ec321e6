//! API query and error types.
//!
//! Success bodies are the core types themselves (`DailyRecord`,
//! `RangeSeries`, `ComparisonResult`) serialized with camelCase fields.

use axum::Json;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EmissionsError;

/// Window used when a query omits `days`.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Query parameters for the range and comparison endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// Window length in days (default 7).
    pub days: Option<u32>,
    /// Last day of the window, `YYYY-MM-DD` (default: the server's today).
    pub end: Option<NaiveDate>,
}

impl WindowQuery {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds an error response with the given status.
pub fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<EmissionsError> for ErrorResponse {
    fn from(e: EmissionsError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// HTTP status for a core error.
pub fn status_for(e: &EmissionsError) -> StatusCode {
    match e {
        EmissionsError::InvalidDays(_)
        | EmissionsError::WindowTooLong { .. }
        | EmissionsError::WindowOutOfRange { .. }
        | EmissionsError::Validation(_) => StatusCode::BAD_REQUEST,
        EmissionsError::NotFound(_) => StatusCode::NOT_FOUND,
        EmissionsError::DuplicateRecord { .. } => StatusCode::CONFLICT,
        EmissionsError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
