//! Group handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use rand::{SeedableRng, rngs::StdRng};
use validator::Validate;

use crate::{
    db::Repositories,
    error::AppResult,
    models::{BatchReport, Outcome},
    services::GroupService,
    state::AppState,
};

use super::{
    request::{
        AssignParticipantRequest, AutoGroupRequest, BatchAssignRequest, CreateGroupRequest,
        MergeGroupsRequest, UpdateGroupRequest,
    },
    response::{
        DeletedGroup, DrawResponse, GroupDetailResponse, GroupResponse, GroupStatistics,
        GroupingResult, MembershipChange,
    },
};

fn grouped_message(result: &GroupingResult) -> String {
    format!(
        "Created {} groups for {} participants",
        result.groups_created, result.participants_grouped
    )
}

/// Group ungrouped participants by organization
pub async fn auto_group(
    State(state): State<AppState>,
    Json(payload): Json<AutoGroupRequest>,
) -> AppResult<Json<Outcome<GroupingResult>>> {
    let max_group_size = payload
        .max_group_size
        .unwrap_or(state.config().grouping.max_group_size);

    let result = GroupService::auto_group_by_organization(state.repos(), max_group_size).await;
    Ok(Json(Outcome::capture(result, grouped_message)?))
}

/// Group ungrouped participants, sharing groups between small organizations
pub async fn merge_groups(
    State(state): State<AppState>,
    Json(payload): Json<MergeGroupsRequest>,
) -> AppResult<Json<Outcome<GroupingResult>>> {
    let defaults = &state.config().grouping;
    let min_group_size = payload.min_group_size.unwrap_or(defaults.min_group_size);
    let max_group_size = payload.max_group_size.unwrap_or(defaults.max_group_size);

    let result =
        GroupService::merge_small_organizations(state.repos(), min_group_size, max_group_size).await;
    Ok(Json(Outcome::capture(result, grouped_message)?))
}

/// Draw the performance order of all groups
pub async fn draw_lots(State(state): State<AppState>) -> AppResult<Json<Outcome<DrawResponse>>> {
    let mut rng = StdRng::from_os_rng();
    let result = GroupService::draw_lots(state.repos(), &mut rng).await;

    Ok(Json(Outcome::capture(result, |d| {
        format!("Drew the order of {} groups", d.results.len())
    })?))
}

async fn create(repos: &Repositories, payload: CreateGroupRequest) -> AppResult<GroupResponse> {
    payload.validate()?;
    GroupService::create_group(repos, payload.into_new_group()?).await
}

/// Create an empty group
pub async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> AppResult<Json<Outcome<GroupResponse>>> {
    let result = create(state.repos(), payload).await;
    Ok(Json(Outcome::capture(result, |g| format!("Group {} created", g.name))?))
}

/// List groups in performance order
pub async fn list_groups(State(state): State<AppState>) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = GroupService::list_groups(state.repos()).await?;
    Ok(Json(groups))
}

/// Get a group with its members
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<GroupDetailResponse>> {
    let group = GroupService::get_group(state.repos(), id).await?;
    Ok(Json(group))
}

async fn update(repos: &Repositories, id: i64, payload: UpdateGroupRequest) -> AppResult<GroupResponse> {
    payload.validate()?;
    GroupService::update_group(repos, id, payload.into_changes()?).await
}

/// Rename or redescribe a group
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateGroupRequest>,
) -> AppResult<Json<Outcome<GroupResponse>>> {
    let result = update(state.repos(), id, payload).await;
    Ok(Json(Outcome::capture(result, |g| format!("Group {} updated", g.id))?))
}

/// Delete a group, releasing its members
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Outcome<DeletedGroup>>> {
    let result = GroupService::delete_group(state.repos(), id).await;

    Ok(Json(Outcome::capture(result, |d| {
        format!("Group {} deleted, {} members released", d.group_id, d.released_members)
    })?))
}

/// Put a participant into a group
pub async fn assign_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignParticipantRequest>,
) -> AppResult<Json<Outcome<MembershipChange>>> {
    let result = GroupService::assign_participant(state.repos(), id, payload.participant_id).await;

    Ok(Json(Outcome::capture(result, |c| {
        format!("Participant {} assigned to group {}", c.participant_id, id)
    })?))
}

/// Take a participant out of a group
pub async fn remove_participant(
    State(state): State<AppState>,
    Path((id, participant_id)): Path<(i64, i64)>,
) -> AppResult<Json<Outcome<MembershipChange>>> {
    let result = GroupService::remove_participant(state.repos(), id, participant_id).await;

    Ok(Json(Outcome::capture(result, |c| {
        format!("Participant {} removed from group {}", c.participant_id, id)
    })?))
}

/// Apply many group assignments at once
pub async fn batch_assign(
    State(state): State<AppState>,
    Json(payload): Json<BatchAssignRequest>,
) -> AppResult<Json<BatchReport<MembershipChange>>> {
    let report = GroupService::batch_assign(state.repos(), payload.assignments).await?;
    Ok(Json(report))
}

/// Membership and attendance per group
pub async fn get_statistics(State(state): State<AppState>) -> AppResult<Json<GroupStatistics>> {
    let statistics = GroupService::statistics(state.repos()).await?;
    Ok(Json(statistics))
}
