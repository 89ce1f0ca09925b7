//! Participant request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::{MAX_NAME_LENGTH, MAX_ORGANIZATION_LENGTH},
    error::AppResult,
    models::{NewParticipant, ParticipantChanges},
    utils::{PHONE_REGEX, required_text, sanitize_string},
};

/// Register participant request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateParticipantRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,

    #[validate(length(min = 1, max = MAX_ORGANIZATION_LENGTH))]
    pub organization: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be 4-19 digits with an optional leading +"))]
    pub phone: String,

    /// Place the participant in an existing group right away
    pub group_id: Option<i64>,
}

impl CreateParticipantRequest {
    /// Sanitized fields ready for storage
    pub fn into_new_participant(self) -> AppResult<NewParticipant> {
        Ok(NewParticipant {
            name: required_text("name", &self.name)?,
            organization: required_text("organization", &self.organization)?,
            phone: self.phone.trim().to_string(),
            group_id: self.group_id,
        })
    }
}

/// Batch registration request
#[derive(Debug, Deserialize)]
pub struct BatchCreateParticipantsRequest {
    pub participants: Vec<CreateParticipantRequest>,
}

/// Update participant request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateParticipantRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = MAX_ORGANIZATION_LENGTH))]
    pub organization: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Phone must be 4-19 digits with an optional leading +"))]
    pub phone: Option<String>,
}

impl UpdateParticipantRequest {
    pub fn into_changes(self) -> AppResult<ParticipantChanges> {
        Ok(ParticipantChanges {
            name: self.name.map(|n| required_text("name", &n)).transpose()?,
            organization: self
                .organization
                .map(|o| required_text("organization", &o))
                .transpose()?,
            phone: self.phone.map(|p| sanitize_string(&p)),
        })
    }
}

/// List participants query parameters
#[derive(Debug, Deserialize)]
pub struct ListParticipantsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Substring of name, organization or phone
    pub search: Option<String>,
}
