//! Utility functions

pub mod time;
pub mod token;
pub mod validation;

pub use time::{now_utc, percentage, ratio, round_display};
pub use token::generate_qr_code;
pub use validation::{
    required_text, sanitize_string, PHONE_REGEX, validate_group_bounds, validate_round,
    validate_score,
};
