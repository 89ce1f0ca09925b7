//! Judge request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::{MAX_NAME_LENGTH, MAX_ORGANIZATION_LENGTH},
    error::AppResult,
    models::NewJudge,
    utils::{required_text, sanitize_string},
};

/// Create judge request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJudgeRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,

    #[validate(length(max = MAX_ORGANIZATION_LENGTH))]
    pub organization: Option<String>,
}

impl CreateJudgeRequest {
    pub fn into_new_judge(self) -> AppResult<NewJudge> {
        Ok(NewJudge {
            name: required_text("name", &self.name)?,
            organization: self
                .organization
                .map(|o| sanitize_string(&o))
                .filter(|o| !o.is_empty()),
        })
    }
}

/// Activate or deactivate a judge
#[derive(Debug, Deserialize)]
pub struct SetJudgeActiveRequest {
    pub is_active: bool,
}

/// List judges query parameters
#[derive(Debug, Deserialize)]
pub struct ListJudgesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
