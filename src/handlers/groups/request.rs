//! Group request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::{MAX_GROUP_DESCRIPTION_LENGTH, MAX_GROUP_NAME_LENGTH},
    error::AppResult,
    models::{GroupChanges, NewGroup},
    utils::{required_text, sanitize_string},
};

/// Automatic grouping by organization
#[derive(Debug, Default, Deserialize)]
pub struct AutoGroupRequest {
    /// Falls back to the configured default
    pub max_group_size: Option<usize>,
}

/// Automatic grouping with small organizations merged
#[derive(Debug, Default, Deserialize)]
pub struct MergeGroupsRequest {
    pub min_group_size: Option<usize>,
    pub max_group_size: Option<usize>,
}

/// Create group request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = MAX_GROUP_NAME_LENGTH))]
    pub name: String,

    #[validate(length(max = MAX_GROUP_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
}

impl CreateGroupRequest {
    pub fn into_new_group(self) -> AppResult<NewGroup> {
        Ok(NewGroup {
            name: required_text("name", &self.name)?,
            description: self.description.map(|d| sanitize_string(&d)),
        })
    }
}

/// Update group request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = MAX_GROUP_NAME_LENGTH))]
    pub name: Option<String>,

    #[validate(length(max = MAX_GROUP_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    pub fn into_changes(self) -> AppResult<GroupChanges> {
        Ok(GroupChanges {
            name: self.name.map(|n| required_text("name", &n)).transpose()?,
            description: self.description.map(|d| sanitize_string(&d)),
        })
    }
}

/// Add one participant to a group
#[derive(Debug, Deserialize)]
pub struct AssignParticipantRequest {
    pub participant_id: i64,
}

/// One item of a batch assignment
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AssignmentItem {
    pub participant_id: i64,
    pub group_id: i64,
}

/// Batch group assignment request
#[derive(Debug, Deserialize)]
pub struct BatchAssignRequest {
    pub assignments: Vec<AssignmentItem>,
}
