//! Structured operation results
//!
//! Domain failures (bad input, missing references, state conflicts) are
//! returned as data so callers, batch loops in particular, can carry on.

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Result of a single operation: success flag, message, machine-readable code
#[derive(Debug, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_code: None,
            details: None,
            data: Some(data),
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            message: err.public_message(),
            error_code: Some(err.error_code()),
            details: err.details(),
            data: None,
        }
    }

    /// Turn domain errors into failed outcomes; infrastructure errors stay `Err`.
    pub fn capture(
        result: AppResult<T>,
        message: impl FnOnce(&T) -> String,
    ) -> AppResult<Self> {
        match result {
            Ok(data) => {
                let message = message(&data);
                Ok(Self::success(message, data))
            }
            Err(err) if err.is_domain() => Ok(Self::failure(&err)),
            Err(err) => Err(err),
        }
    }

    pub fn error_code(&self) -> Option<&'static str> {
        self.error_code
    }
}

/// Successful item of a batch
#[derive(Debug, Serialize)]
pub struct BatchItem<T> {
    pub index: usize,
    pub data: T,
}

/// Failed item of a batch
#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub index: usize,
    pub error_code: &'static str,
    pub message: String,
}

/// Per-index report of a batch operation; one failure never aborts the rest
#[derive(Debug, Serialize)]
pub struct BatchReport<T> {
    pub success_count: usize,
    pub error_count: usize,
    pub results: Vec<BatchItem<T>>,
    pub errors: Vec<BatchFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            success_count: 0,
            error_count: 0,
            results: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of the item at `index`.
    ///
    /// Callers abort the batch on infrastructure errors instead of recording them.
    pub fn record(&mut self, index: usize, result: AppResult<T>) {
        match result {
            Ok(data) => {
                self.success_count += 1;
                self.results.push(BatchItem { index, data });
            }
            Err(err) => {
                self.error_count += 1;
                self.errors.push(BatchFailure {
                    index,
                    error_code: err.error_code(),
                    message: err.public_message(),
                });
            }
        }
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.errors.iter().map(|e| e.index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_keeps_infrastructure_errors() {
        let domain: AppResult<i32> = Err(AppError::NotCheckedIn);
        let outcome = Outcome::capture(domain, |_| String::new()).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_code(), Some("NOT_CHECKED_IN"));

        let infra: AppResult<i32> = Err(AppError::Database("connection reset".to_string()));
        assert!(Outcome::capture(infra, |_| String::new()).is_err());

        let ok = Outcome::capture(Ok(7), |v| format!("got {v}")).unwrap();
        assert!(ok.success);
        assert_eq!(ok.message, "got 7");
        assert_eq!(ok.data, Some(7));
    }

    #[test]
    fn test_batch_report_isolates_failures() {
        let mut report = BatchReport::new();
        report.record(0, Ok("a"));
        report.record(1, Err(AppError::InvalidScore(12.0)));
        report.record(2, Ok("c"));

        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.failed_indices(), vec![1]);
        assert_eq!(report.errors[0].error_code, "INVALID_SCORE_RANGE");
    }
}
