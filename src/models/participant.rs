//! Participant model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::PHONE_SUFFIX_LENGTH;

/// Participant database model
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub organization: String,
    pub phone: String,
    /// Always the trailing characters of `phone`
    pub phone_last4: String,
    pub group_id: Option<i64>,
    pub qr_code_id: String,
    pub is_checked_in: bool,
    pub checkin_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Current attendance state
    pub fn checkin_state(&self) -> CheckinState {
        if self.is_checked_in {
            CheckinState::CheckedIn
        } else {
            CheckinState::NotCheckedIn
        }
    }

    /// Check the phone suffix and name factors of a check-in attempt.
    ///
    /// Surrounding whitespace on the supplied values is ignored; otherwise the
    /// comparison is exact and case-sensitive.
    pub fn matches_identity(&self, phone_last4: &str, name: &str) -> bool {
        self.phone_last4 == phone_last4.trim() && self.name == name.trim()
    }
}

/// Attendance state of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckinState {
    NotCheckedIn,
    CheckedIn,
}

impl std::fmt::Display for CheckinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCheckedIn => write!(f, "NOT_CHECKED_IN"),
            Self::CheckedIn => write!(f, "CHECKED_IN"),
        }
    }
}

/// Derive the verification suffix from a phone number
pub fn phone_suffix(phone: &str) -> String {
    let chars: Vec<char> = phone.trim().chars().collect();
    let start = chars.len().saturating_sub(PHONE_SUFFIX_LENGTH);
    chars[start..].iter().collect()
}

/// Validated fields for a participant about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub group_id: Option<i64>,
}

impl NewParticipant {
    pub fn phone_last4(&self) -> String {
        phone_suffix(&self.phone)
    }
}

/// Partial update of a participant; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantChanges {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
}

impl ParticipantChanges {
    /// Recomputed suffix when the phone changes
    pub fn phone_last4(&self) -> Option<String> {
        self.phone.as_deref().map(phone_suffix)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.organization.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_suffix() {
        assert_eq!(phone_suffix("13812345678"), "5678");
        assert_eq!(phone_suffix(" 13812345678 "), "5678");
        assert_eq!(phone_suffix("123"), "123");
        assert_eq!(phone_suffix(""), "");
    }

    #[test]
    fn test_changes_recompute_suffix() {
        let changes = ParticipantChanges {
            phone: Some("13900001111".to_string()),
            ..Default::default()
        };
        assert_eq!(changes.phone_last4().as_deref(), Some("1111"));
        assert!(ParticipantChanges::default().phone_last4().is_none());
        assert!(ParticipantChanges::default().is_empty());
    }
}
