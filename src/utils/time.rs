//! Time and number presentation utilities

use chrono::{DateTime, Utc};

use crate::constants::DISPLAY_DECIMALS;

/// Get current UTC time
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Round a value for display; stored values are never rounded
pub fn round_display(value: f64) -> f64 {
    let factor = 10f64.powi(DISPLAY_DECIMALS);
    (value * factor).round() / factor
}

/// `part / whole` as a display-rounded ratio, 0 when `whole` is 0
pub fn ratio(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round_display(part as f64 / whole as f64)
}

/// `part / whole` as a display-rounded percentage, 0 when `whole` is 0
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round_display(part as f64 * 100.0 / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_display() {
        assert_eq!(round_display(8.333333), 8.33);
        assert_eq!(round_display(8.336), 8.34);
        assert_eq!(round_display(10.0), 10.0);
    }

    #[test]
    fn test_ratio_handles_empty_denominator() {
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(ratio(1, 3), 0.33);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(5, 0), 0.0);
    }
}
