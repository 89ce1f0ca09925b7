//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.
//!
//! Domain errors (validation, missing references, state conflicts,
//! configuration) are reported to callers as structured results; see
//! [`crate::models::Outcome`]. Infrastructure errors stay hard failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Score {0} is outside the allowed range 0-10")]
    InvalidScore(f64),

    #[error("Minimum group size {min} exceeds maximum group size {max}")]
    InvalidGroupSize { min: usize, max: usize },

    #[error("Identity verification failed, please check the information you entered")]
    IdentityVerificationFailed,

    #[error("Judge {0} is not active")]
    JudgeInactive(i64),

    // Resource errors
    #[error("Participant {0} not found")]
    ParticipantNotFound(i64),

    #[error("Judge {0} not found")]
    JudgeNotFound(i64),

    #[error("Group {0} not found")]
    GroupNotFound(i64),

    #[error("Score {0} not found")]
    ScoreNotFound(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // State conflicts
    #[error("{}", already_checked_in_message(.checkin_time))]
    AlreadyCheckedIn { checkin_time: Option<DateTime<Utc>> },

    #[error("Participant has not checked in")]
    NotCheckedIn,

    // Configuration errors
    #[error("No groups exist to draw lots for")]
    NoGroups,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

fn already_checked_in_message(checkin_time: &Option<DateTime<Utc>>) -> String {
    match checkin_time {
        Some(at) => format!("Already checked in at {}", at.format("%H:%M:%S")),
        None => "Already checked in".to_string(),
    }
}

/// Broad classification of an [`AppError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Configuration,
    Infrastructure,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidScore(_) => "INVALID_SCORE_RANGE",
            Self::InvalidGroupSize { .. } => "INVALID_GROUP_SIZE",
            Self::IdentityVerificationFailed => "IDENTITY_VERIFICATION_FAILED",
            Self::JudgeInactive(_) => "JUDGE_INACTIVE",
            Self::ParticipantNotFound(_) => "PARTICIPANT_NOT_FOUND",
            Self::JudgeNotFound(_) => "JUDGE_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::ScoreNotFound(_) => "SCORE_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            Self::NotCheckedIn => "NOT_CHECKED_IN",
            Self::NoGroups => "NO_GROUPS",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidScore(_)
            | Self::InvalidGroupSize { .. }
            | Self::IdentityVerificationFailed
            | Self::JudgeInactive(_) => ErrorKind::Validation,
            Self::ParticipantNotFound(_)
            | Self::JudgeNotFound(_)
            | Self::GroupNotFound(_)
            | Self::ScoreNotFound(_)
            | Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) | Self::AlreadyCheckedIn { .. } | Self::NotCheckedIn => {
                ErrorKind::Conflict
            }
            Self::NoGroups | Self::Configuration(_) => ErrorKind::Configuration,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Infrastructure,
        }
    }

    /// Whether this error describes a rejected request rather than a broken system
    pub fn is_domain(&self) -> bool {
        self.kind() != ErrorKind::Infrastructure
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Configuration => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra machine-readable context, if any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::AlreadyCheckedIn {
                checkin_time: Some(at),
            } => Some(serde_json::json!({ "checkin_time": at })),
            Self::InvalidGroupSize { min, max } => Some(serde_json::json!({
                "min_group_size": min,
                "max_group_size": max,
            })),
            _ => None,
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::AlreadyExists("Resource already exists".to_string())
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_classified() {
        assert_eq!(AppError::InvalidScore(11.0).kind(), ErrorKind::Validation);
        assert_eq!(AppError::ParticipantNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            AppError::AlreadyCheckedIn { checkin_time: None }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(AppError::NoGroups.kind(), ErrorKind::Configuration);
        assert!(!AppError::Database("down".to_string()).is_domain());
    }

    #[test]
    fn test_already_checked_in_reports_time() {
        let at = DateTime::parse_from_rfc3339("2024-09-24T08:15:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let err = AppError::AlreadyCheckedIn {
            checkin_time: Some(at),
        };

        assert_eq!(err.error_code(), "ALREADY_CHECKED_IN");
        assert_eq!(err.to_string(), "Already checked in at 08:15:30");
        assert!(err.details().is_some());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidScore(-1.0).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::GroupNotFound(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotCheckedIn.status_code(), StatusCode::CONFLICT);
    }
}
