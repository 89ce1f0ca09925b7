//! Group response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    handlers::participants::ParticipantResponse,
    models::{Group, Participant},
};

/// Group response
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub draw_order: Option<i32>,
    pub member_count: i64,
    pub checked_in_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupResponse {
    /// Build from a group and the participants currently in it
    pub fn from_members(group: Group, members: &[&Participant]) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            draw_order: group.draw_order,
            member_count: members.len() as i64,
            checked_in_count: members.iter().filter(|p| p.is_checked_in).count() as i64,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// Group with its members
#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    pub group: GroupResponse,
    pub members: Vec<ParticipantResponse>,
    /// Distinct member organizations, in member order
    pub organizations: Vec<String>,
}

/// Groups created by an automatic grouping run
#[derive(Debug, Serialize)]
pub struct GroupingResult {
    pub groups_created: usize,
    pub participants_grouped: usize,
    pub groups: Vec<GroupResponse>,
}

/// One slot of the performance order
#[derive(Debug, Serialize)]
pub struct DrawResult {
    pub group_id: i64,
    pub group_name: String,
    pub draw_order: i32,
    pub member_count: i64,
}

/// Lottery outcome, in draw order
#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub results: Vec<DrawResult>,
}

/// Membership change of one participant
#[derive(Debug, Serialize)]
pub struct MembershipChange {
    pub participant_id: i64,
    pub group_id: Option<i64>,
}

/// Per-group figures
#[derive(Debug, Serialize)]
pub struct GroupStats {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub organizations: Vec<String>,
    pub checkin_rate: f64,
}

/// Grouping and attendance overview
#[derive(Debug, Serialize)]
pub struct GroupStatistics {
    pub total_groups: usize,
    pub total_participants: i64,
    pub ungrouped_participants: i64,
    pub total_checked_in: i64,
    pub overall_checkin_rate: f64,
    pub groups: Vec<GroupStats>,
}

/// Acknowledgement of a group deletion
#[derive(Debug, Serialize)]
pub struct DeletedGroup {
    pub group_id: i64,
    pub released_members: usize,
}
