//! Organization-based group planning
//!
//! Pure planning step of automatic grouping: decides which participants go
//! together and how each group is described. Persisting the plan is left to
//! [`super::GroupService`].

use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::Participant,
    utils::validate_group_bounds,
};

/// A group about to be created, with the participants that will join it
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedGroup {
    pub description: String,
    pub member_ids: Vec<i64>,
}

impl PlannedGroup {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// Members of one organization, in record order
struct OrganizationBucket<'a> {
    organization: &'a str,
    member_ids: Vec<i64>,
}

/// Bucket participants by organization, organizations in first-appearance order
fn bucket_by_organization(participants: &[Participant]) -> Vec<OrganizationBucket<'_>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<OrganizationBucket<'_>> = Vec::new();

    for participant in participants {
        let organization = participant.organization.as_str();
        let position = *positions.entry(organization).or_insert_with(|| {
            buckets.push(OrganizationBucket {
                organization,
                member_ids: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[position].member_ids.push(participant.id);
    }

    buckets
}

/// One group per organization, split into consecutive chunks when it is too large
fn pack_organization(bucket: &OrganizationBucket<'_>, max_group_size: usize, out: &mut Vec<PlannedGroup>) {
    let count = bucket.member_ids.len();

    if count <= max_group_size {
        out.push(PlannedGroup {
            description: format!("{} ({} members)", bucket.organization, count),
            member_ids: bucket.member_ids.clone(),
        });
        return;
    }

    let total = count.div_ceil(max_group_size);
    for (index, chunk) in bucket.member_ids.chunks(max_group_size).enumerate() {
        out.push(PlannedGroup {
            description: format!(
                "{} part {}/{} ({} members)",
                bucket.organization,
                index + 1,
                total,
                chunk.len()
            ),
            member_ids: chunk.to_vec(),
        });
    }
}

/// Plan organization-homogeneous groups of at most `max_group_size` members
pub fn pack_by_organization(participants: &[Participant], max_group_size: usize) -> AppResult<Vec<PlannedGroup>> {
    validate_group_bounds(None, max_group_size)?;

    let mut planned = Vec::new();
    for bucket in bucket_by_organization(participants) {
        pack_organization(&bucket, max_group_size, &mut planned);
    }

    Ok(planned)
}

/// Running group of small organizations
#[derive(Default)]
struct MergeBuffer {
    labels: Vec<String>,
    member_ids: Vec<i64>,
}

impl MergeBuffer {
    fn flush_into(&mut self, out: &mut Vec<PlannedGroup>) {
        if self.member_ids.is_empty() {
            return;
        }
        let buffer = std::mem::take(self);
        out.push(PlannedGroup {
            description: buffer.labels.join(" + "),
            member_ids: buffer.member_ids,
        });
    }
}

/// Plan groups where organizations below `min_group_size` share groups.
///
/// Large organizations are packed first, exactly as [`pack_by_organization`]
/// does. Small organizations are then appended in order to a running group,
/// which is closed whenever the next organization would push it past
/// `max_group_size`.
pub fn merge_small_organizations(
    participants: &[Participant],
    min_group_size: usize,
    max_group_size: usize,
) -> AppResult<Vec<PlannedGroup>> {
    validate_group_bounds(Some(min_group_size), max_group_size)?;

    let (large, small): (Vec<_>, Vec<_>) = bucket_by_organization(participants)
        .into_iter()
        .partition(|bucket| bucket.member_ids.len() >= min_group_size);

    let mut planned = Vec::new();
    for bucket in &large {
        pack_organization(bucket, max_group_size, &mut planned);
    }

    let mut buffer = MergeBuffer::default();
    for bucket in small {
        let count = bucket.member_ids.len();
        // Small means count < min <= max, so one organization always fits alone.
        debug_assert!(count <= max_group_size);

        if buffer.member_ids.len() + count > max_group_size {
            buffer.flush_into(&mut planned);
        }
        buffer.labels.push(format!("{} ({})", bucket.organization, count));
        buffer.member_ids.extend(bucket.member_ids);
    }
    buffer.flush_into(&mut planned);

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    fn participants(layout: &[(&str, usize)]) -> Vec<Participant> {
        let now = now_utc();
        let mut id = 0;
        let mut out = Vec::new();
        for (organization, count) in layout {
            for _ in 0..*count {
                id += 1;
                out.push(Participant {
                    id,
                    name: format!("P{id}"),
                    organization: organization.to_string(),
                    phone: format!("1380000{id:04}"),
                    phone_last4: format!("{id:04}"),
                    group_id: None,
                    qr_code_id: format!("QR{id:06}"),
                    is_checked_in: false,
                    checkin_time: None,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
        out
    }

    fn sizes(groups: &[PlannedGroup]) -> Vec<usize> {
        groups.iter().map(PlannedGroup::len).collect()
    }

    #[test]
    fn test_small_organization_stays_together() {
        let groups = pack_by_organization(&participants(&[("A", 7)]), 20).unwrap();

        assert_eq!(sizes(&groups), vec![7]);
        assert_eq!(groups[0].description, "A (7 members)");
    }

    #[test]
    fn test_large_organization_is_split() {
        let input = participants(&[("A", 25)]);
        let groups = pack_by_organization(&input, 20).unwrap();

        assert_eq!(sizes(&groups), vec![20, 5]);
        assert_eq!(groups[0].description, "A part 1/2 (20 members)");
        assert_eq!(groups[1].description, "A part 2/2 (5 members)");

        let mut covered: Vec<i64> = groups.iter().flat_map(|g| g.member_ids.clone()).collect();
        covered.sort();
        assert_eq!(covered, input.iter().map(|p| p.id).collect::<Vec<_>>());
    }

    #[test]
    fn test_organizations_keep_first_appearance_order() {
        let mut input = participants(&[("B", 2), ("A", 3)]);
        input.swap(0, 4);
        let groups = pack_by_organization(&input, 20).unwrap();

        assert!(groups[0].description.starts_with("A"));
        assert!(groups[1].description.starts_with("B"));
    }

    #[test]
    fn test_exact_multiple_has_no_remainder_group() {
        let groups = pack_by_organization(&participants(&[("A", 40)]), 20).unwrap();
        assert_eq!(sizes(&groups), vec![20, 20]);
    }

    #[test]
    fn test_empty_input_plans_nothing() {
        assert!(pack_by_organization(&[], 20).unwrap().is_empty());
        assert!(merge_small_organizations(&[], 8, 20).unwrap().is_empty());
    }

    #[test]
    fn test_zero_max_is_rejected() {
        let err = pack_by_organization(&participants(&[("A", 1)]), 0).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_merge_rejects_inverted_bounds() {
        let err = merge_small_organizations(&participants(&[("A", 1)]), 21, 20).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GROUP_SIZE");
    }

    #[test]
    fn test_merge_combines_small_organizations() {
        let input = participants(&[("A", 3), ("B", 2), ("C", 10)]);
        let groups = merge_small_organizations(&input, 8, 20).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].description, "C (10 members)");
        assert_eq!(groups[1].description, "A (3) + B (2)");
        assert_eq!(groups[1].len(), 5);
    }

    #[test]
    fn test_merge_flushes_before_overflow() {
        let input = participants(&[("A", 7), ("B", 7), ("C", 7), ("D", 1)]);
        let groups = merge_small_organizations(&input, 8, 15).unwrap();

        assert_eq!(sizes(&groups), vec![14, 8]);
        assert_eq!(groups[0].description, "A (7) + B (7)");
        assert_eq!(groups[1].description, "C (7) + D (1)");
        assert!(groups.iter().all(|g| g.len() <= 15));
    }

    #[test]
    fn test_merge_splits_large_organizations() {
        let input = participants(&[("A", 25), ("B", 3)]);
        let groups = merge_small_organizations(&input, 8, 20).unwrap();

        assert_eq!(sizes(&groups), vec![20, 5, 3]);
    }
}
