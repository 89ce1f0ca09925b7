//! Check-in request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_NAME_LENGTH, MAX_NOTE_LENGTH};

/// Self-service check-in: the scanned code plus two identity factors
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCheckinRequest {
    #[validate(length(min = 1, max = 64))]
    pub qr_code_id: String,

    #[validate(length(min = 1, max = 20))]
    pub phone_last4: String,

    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,
}

/// Admin check-in or cancellation
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdminCheckinRequest {
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub note: Option<String>,
}

/// Recent feed query parameters
#[derive(Debug, Deserialize)]
pub struct RecentCheckinsQuery {
    pub limit: Option<i64>,
}
