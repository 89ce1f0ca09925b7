//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    constants::{MAX_SCORE, MIN_SCORE},
    error::{AppError, AppResult},
};

/// Phone numbers: 4-19 digits with an optional leading `+`
pub static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{4,19}$").unwrap());

/// Validate a judge score lies within the allowed range
pub fn validate_score(score: f64) -> AppResult<()> {
    if score.is_nan() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::InvalidScore(score));
    }
    Ok(())
}

/// Validate automatic grouping bounds
pub fn validate_group_bounds(min_group_size: Option<usize>, max_group_size: usize) -> AppResult<()> {
    if max_group_size == 0 {
        return Err(AppError::Validation(
            "Maximum group size must be at least 1".to_string(),
        ));
    }
    if let Some(min) = min_group_size {
        if min > max_group_size {
            return Err(AppError::InvalidGroupSize {
                min,
                max: max_group_size,
            });
        }
    }
    Ok(())
}

/// Validate a round number
pub fn validate_round(round_number: i32) -> AppResult<()> {
    if round_number < 1 {
        return Err(AppError::Validation(
            "Round number must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a required text field, rejecting values that end up empty
pub fn required_text(field: &str, input: &str) -> AppResult<String> {
    let sanitized = sanitize_string(input);
    if sanitized.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("13812345678"));
        assert!(PHONE_REGEX.is_match("+8613812345678"));
        assert!(!PHONE_REGEX.is_match("123"));
        assert!(!PHONE_REGEX.is_match("138-1234-5678"));
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(0.0).is_ok());
        assert!(validate_score(10.0).is_ok());
        assert!(validate_score(7.25).is_ok());
        assert_eq!(
            validate_score(11.0).unwrap_err().error_code(),
            "INVALID_SCORE_RANGE"
        );
        assert!(validate_score(-0.5).is_err());
        assert!(validate_score(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_group_bounds() {
        assert!(validate_group_bounds(None, 20).is_ok());
        assert!(validate_group_bounds(Some(8), 20).is_ok());
        assert!(validate_group_bounds(Some(20), 20).is_ok());
        assert_eq!(
            validate_group_bounds(Some(21), 20).unwrap_err().error_code(),
            "INVALID_GROUP_SIZE"
        );
        assert_eq!(
            validate_group_bounds(None, 0).unwrap_err().error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  张三 ").unwrap(), "张三");
        assert!(required_text("name", " \t ").is_err());
    }
}
