//! Group service

use std::collections::HashMap;

use rand::Rng;

use crate::{
    constants::{GROUP_NAME_PREFIX, MAX_BATCH_SIZE},
    db::Repositories,
    error::{AppError, AppResult},
    handlers::groups::{
        request::AssignmentItem,
        response::{
            DeletedGroup, DrawResponse, DrawResult, GroupDetailResponse, GroupResponse,
            GroupStatistics, GroupStats, GroupingResult, MembershipChange,
        },
    },
    models::{BatchReport, Group, GroupChanges, NewGroup, Participant},
    utils::percentage,
};

use super::{
    grouping::{self, PlannedGroup},
    lottery,
};

/// Index participants by the group they belong to
fn members_by_group(participants: &[Participant]) -> HashMap<i64, Vec<&Participant>> {
    let mut members: HashMap<i64, Vec<&Participant>> = HashMap::new();
    for participant in participants {
        if let Some(group_id) = participant.group_id {
            members.entry(group_id).or_default().push(participant);
        }
    }
    members
}

/// Distinct organizations, in member order
fn organizations_of(members: &[&Participant]) -> Vec<String> {
    let mut organizations: Vec<String> = Vec::new();
    for member in members {
        if !organizations.contains(&member.organization) {
            organizations.push(member.organization.clone());
        }
    }
    organizations
}

/// Group service for business logic
pub struct GroupService;

impl GroupService {
    /// Create the planned groups and move their members in.
    ///
    /// Groups are written one at a time; a failure part way leaves the groups
    /// created so far in place and the remaining participants ungrouped.
    async fn materialize(repos: &Repositories, plans: Vec<PlannedGroup>) -> AppResult<GroupingResult> {
        let existing = repos.groups.count().await?;
        let mut groups = Vec::with_capacity(plans.len());
        let mut participants_grouped = 0;

        for (index, plan) in plans.into_iter().enumerate() {
            let group = repos
                .groups
                .create(&NewGroup {
                    name: format!("{} {}", GROUP_NAME_PREFIX, existing + index as i64 + 1),
                    description: Some(plan.description),
                })
                .await?;
            repos
                .participants
                .assign_group(&plan.member_ids, group.id)
                .await?;

            participants_grouped += plan.member_ids.len();
            groups.push(GroupResponse {
                member_count: plan.member_ids.len() as i64,
                checked_in_count: 0,
                ..GroupResponse::from_members(group, &[])
            });
        }

        Ok(GroupingResult {
            groups_created: groups.len(),
            participants_grouped,
            groups,
        })
    }

    /// Pack every ungrouped participant into organization groups
    pub async fn auto_group_by_organization(
        repos: &Repositories,
        max_group_size: usize,
    ) -> AppResult<GroupingResult> {
        let ungrouped = repos.participants.list_ungrouped().await?;
        let plans = grouping::pack_by_organization(&ungrouped, max_group_size)?;
        let result = Self::materialize(repos, plans).await?;

        tracing::info!(
            max_group_size,
            groups_created = result.groups_created,
            participants_grouped = result.participants_grouped,
            "Automatic grouping finished"
        );
        Ok(result)
    }

    /// Like [`Self::auto_group_by_organization`], sharing groups between small organizations
    pub async fn merge_small_organizations(
        repos: &Repositories,
        min_group_size: usize,
        max_group_size: usize,
    ) -> AppResult<GroupingResult> {
        let ungrouped = repos.participants.list_ungrouped().await?;
        let plans = grouping::merge_small_organizations(&ungrouped, min_group_size, max_group_size)?;
        let result = Self::materialize(repos, plans).await?;

        tracing::info!(
            min_group_size,
            max_group_size,
            groups_created = result.groups_created,
            participants_grouped = result.participants_grouped,
            "Merged grouping finished"
        );
        Ok(result)
    }

    /// Draw a fresh performance order for every group
    pub async fn draw_lots<R: Rng + ?Sized>(repos: &Repositories, rng: &mut R) -> AppResult<DrawResponse> {
        let groups = repos.groups.list().await?;
        let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        let assignments = lottery::draw_permutation(&group_ids, rng)?;

        repos.groups.replace_draw_orders(&assignments).await?;

        let participants = repos.participants.list_all().await?;
        let members = members_by_group(&participants);
        let names: HashMap<i64, String> = groups.into_iter().map(|g| (g.id, g.name)).collect();

        let mut results: Vec<DrawResult> = assignments
            .iter()
            .map(|a| DrawResult {
                group_id: a.group_id,
                group_name: names.get(&a.group_id).cloned().unwrap_or_default(),
                draw_order: a.draw_order,
                member_count: members.get(&a.group_id).map_or(0, |m| m.len() as i64),
            })
            .collect();
        results.sort_by_key(|r| r.draw_order);

        tracing::info!(groups = results.len(), "Lots drawn");
        Ok(DrawResponse { results })
    }

    async fn find_group(repos: &Repositories, id: i64) -> AppResult<Group> {
        repos
            .groups
            .find_by_id(id)
            .await?
            .ok_or(AppError::GroupNotFound(id))
    }

    /// Create an empty group
    pub async fn create_group(repos: &Repositories, group: NewGroup) -> AppResult<GroupResponse> {
        let group = repos.groups.create(&group).await?;
        tracing::info!(group_id = group.id, name = %group.name, "Group created");
        Ok(GroupResponse::from_members(group, &[]))
    }

    /// Group with its members
    pub async fn get_group(repos: &Repositories, id: i64) -> AppResult<GroupDetailResponse> {
        let group = Self::find_group(repos, id).await?;
        let members = repos.participants.list_by_group(id).await?;
        let refs: Vec<&Participant> = members.iter().collect();

        Ok(GroupDetailResponse {
            organizations: organizations_of(&refs),
            group: GroupResponse::from_members(group, &refs),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    /// All groups, in performance order once lots are drawn
    pub async fn list_groups(repos: &Repositories) -> AppResult<Vec<GroupResponse>> {
        let (groups, participants) =
            futures::try_join!(repos.groups.list(), repos.participants.list_all())?;
        let members = members_by_group(&participants);

        Ok(groups
            .into_iter()
            .map(|g| {
                let group_members = members.get(&g.id).map(Vec::as_slice).unwrap_or(&[]);
                GroupResponse::from_members(g, group_members)
            })
            .collect())
    }

    /// Rename or redescribe a group
    pub async fn update_group(repos: &Repositories, id: i64, changes: GroupChanges) -> AppResult<GroupResponse> {
        let group = repos
            .groups
            .update(id, &changes)
            .await?
            .ok_or(AppError::GroupNotFound(id))?;
        let members = repos.participants.list_by_group(id).await?;
        let refs: Vec<&Participant> = members.iter().collect();

        tracing::info!(group_id = id, "Group updated");
        Ok(GroupResponse::from_members(group, &refs))
    }

    /// Delete a group; its members become ungrouped
    pub async fn delete_group(repos: &Repositories, id: i64) -> AppResult<DeletedGroup> {
        let released_members = repos.participants.list_by_group(id).await?.len();
        if !repos.groups.delete(id).await? {
            return Err(AppError::GroupNotFound(id));
        }

        tracing::info!(group_id = id, released_members, "Group deleted");
        Ok(DeletedGroup {
            group_id: id,
            released_members,
        })
    }

    /// Move a participant into a group
    pub async fn assign_participant(
        repos: &Repositories,
        group_id: i64,
        participant_id: i64,
    ) -> AppResult<MembershipChange> {
        Self::find_group(repos, group_id).await?;
        if !repos.participants.set_group(participant_id, Some(group_id)).await? {
            return Err(AppError::ParticipantNotFound(participant_id));
        }

        tracing::info!(group_id, participant_id, "Participant assigned to group");
        Ok(MembershipChange {
            participant_id,
            group_id: Some(group_id),
        })
    }

    /// Take a participant out of a group
    pub async fn remove_participant(
        repos: &Repositories,
        group_id: i64,
        participant_id: i64,
    ) -> AppResult<MembershipChange> {
        Self::find_group(repos, group_id).await?;
        let participant = repos
            .participants
            .find_by_id(participant_id)
            .await?
            .ok_or(AppError::ParticipantNotFound(participant_id))?;

        if participant.group_id != Some(group_id) {
            return Err(AppError::Validation(format!(
                "Participant {participant_id} is not a member of group {group_id}"
            )));
        }
        repos.participants.set_group(participant_id, None).await?;

        tracing::info!(group_id, participant_id, "Participant removed from group");
        Ok(MembershipChange {
            participant_id,
            group_id: None,
        })
    }

    /// Apply many assignments; each item succeeds or fails on its own
    pub async fn batch_assign(
        repos: &Repositories,
        items: Vec<AssignmentItem>,
    ) -> AppResult<BatchReport<MembershipChange>> {
        if items.len() > MAX_BATCH_SIZE {
            return Err(AppError::Validation(format!(
                "At most {MAX_BATCH_SIZE} assignments per batch"
            )));
        }

        let mut report = BatchReport::new();
        for (index, item) in items.into_iter().enumerate() {
            match Self::assign_participant(repos, item.group_id, item.participant_id).await {
                Err(e) if !e.is_domain() => return Err(e),
                result => report.record(index, result),
            }
        }

        tracing::info!(
            success_count = report.success_count,
            error_count = report.error_count,
            "Batch group assignment finished"
        );
        Ok(report)
    }

    /// Membership and attendance figures per group and overall
    pub async fn statistics(repos: &Repositories) -> AppResult<GroupStatistics> {
        let (groups, participants) =
            futures::try_join!(repos.groups.list(), repos.participants.list_all())?;
        let members = members_by_group(&participants);

        let stats: Vec<GroupStats> = groups
            .into_iter()
            .map(|g| {
                let group_members = members.get(&g.id).map(Vec::as_slice).unwrap_or(&[]);
                let group = GroupResponse::from_members(g, group_members);
                GroupStats {
                    organizations: organizations_of(group_members),
                    checkin_rate: percentage(group.checked_in_count, group.member_count),
                    group,
                }
            })
            .collect();

        let total_participants: i64 = stats.iter().map(|s| s.group.member_count).sum();
        let total_checked_in: i64 = stats.iter().map(|s| s.group.checked_in_count).sum();
        let ungrouped_participants = participants.iter().filter(|p| p.group_id.is_none()).count() as i64;

        Ok(GroupStatistics {
            total_groups: stats.len(),
            total_participants,
            ungrouped_participants,
            total_checked_in,
            overall_checkin_rate: percentage(total_checked_in, total_participants),
            groups: stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::models::NewParticipant;

    async fn register(repos: &Repositories, organization: &str, count: usize) {
        let offset = repos.participants.count().await.unwrap();
        for i in 0..count {
            let n = offset + i as i64;
            repos
                .participants
                .create(
                    &NewParticipant {
                        name: format!("{organization}-{i}"),
                        organization: organization.to_string(),
                        phone: format!("1380000{n:04}"),
                        group_id: None,
                    },
                    &format!("QR{n:06}"),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_auto_group_splits_large_organization() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 25).await;

        let result = GroupService::auto_group_by_organization(&repos, 20).await.unwrap();

        assert_eq!(result.groups_created, 2);
        assert_eq!(result.participants_grouped, 25);
        let counts: Vec<i64> = result.groups.iter().map(|g| g.member_count).collect();
        assert_eq!(counts, vec![20, 5]);
        assert_eq!(result.groups[0].name, "Group 1");
        assert!(repos.participants.list_ungrouped().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_only_sees_new_participants() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 3).await;
        GroupService::auto_group_by_organization(&repos, 20).await.unwrap();

        register(&repos, "B", 2).await;
        let result = GroupService::auto_group_by_organization(&repos, 20).await.unwrap();

        assert_eq!(result.groups_created, 1);
        assert_eq!(result.participants_grouped, 2);
        assert_eq!(result.groups[0].name, "Group 2");
    }

    #[tokio::test]
    async fn test_merge_rejects_inverted_bounds_without_writing() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 3).await;

        let err = GroupService::merge_small_organizations(&repos, 10, 5).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GROUP_SIZE");
        assert_eq!(repos.groups.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_draw_lots_assigns_permutation() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 3).await;
        register(&repos, "B", 3).await;
        register(&repos, "C", 3).await;
        GroupService::auto_group_by_organization(&repos, 20).await.unwrap();

        let first = GroupService::draw_lots(&repos, &mut StdRng::seed_from_u64(9)).await.unwrap();
        let orders: Vec<i32> = first.results.iter().map(|r| r.draw_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(first.results.iter().all(|r| r.member_count == 3));

        // Redrawing overwrites, never duplicates
        GroupService::draw_lots(&repos, &mut StdRng::seed_from_u64(10)).await.unwrap();
        let mut stored: Vec<Option<i32>> = repos
            .groups
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.draw_order)
            .collect();
        stored.sort();
        assert_eq!(stored, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_draw_lots_without_groups() {
        let repos = Repositories::in_memory();
        let err = GroupService::draw_lots(&repos, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_GROUPS");
    }

    #[tokio::test]
    async fn test_delete_releases_members() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 4).await;
        let result = GroupService::auto_group_by_organization(&repos, 20).await.unwrap();
        let group_id = result.groups[0].id;

        let deleted = GroupService::delete_group(&repos, group_id).await.unwrap();
        assert_eq!(deleted.released_members, 4);
        assert_eq!(repos.participants.list_ungrouped().await.unwrap().len(), 4);

        let err = GroupService::get_group(&repos, group_id).await.unwrap_err();
        assert_eq!(err.error_code(), "GROUP_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_membership_changes() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 2).await;
        let group = GroupService::create_group(
            &repos,
            NewGroup {
                name: "Finals".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let report = GroupService::batch_assign(
            &repos,
            vec![
                AssignmentItem { participant_id: 1, group_id: group.id },
                AssignmentItem { participant_id: 2, group_id: 99 },
                AssignmentItem { participant_id: 42, group_id: group.id },
            ],
        )
        .await
        .unwrap();
        assert_eq!(report.success_count, 1);
        assert_eq!(report.errors[0].error_code, "GROUP_NOT_FOUND");
        assert_eq!(report.errors[1].error_code, "PARTICIPANT_NOT_FOUND");

        let err = GroupService::remove_participant(&repos, group.id, 2).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        GroupService::remove_participant(&repos, group.id, 1).await.unwrap();
        let detail = GroupService::get_group(&repos, group.id).await.unwrap();
        assert!(detail.members.is_empty());
    }

    #[tokio::test]
    async fn test_statistics() {
        let repos = Repositories::in_memory();
        register(&repos, "A", 2).await;
        register(&repos, "B", 1).await;
        GroupService::merge_small_organizations(&repos, 8, 20).await.unwrap();
        register(&repos, "C", 1).await;

        let stats = GroupService::statistics(&repos).await.unwrap();
        assert_eq!(stats.total_groups, 1);
        assert_eq!(stats.total_participants, 3);
        assert_eq!(stats.ungrouped_participants, 1);
        assert_eq!(stats.groups[0].organizations, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(stats.overall_checkin_rate, 0.0);
    }
}
