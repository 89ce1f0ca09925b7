//! Performance order lottery

use rand::{Rng, seq::SliceRandom};

use crate::{error::{AppError, AppResult}, models::DrawAssignment};

/// Assign a uniformly random permutation of `1..=N` to the given groups
pub fn draw_permutation<R: Rng + ?Sized>(group_ids: &[i64], rng: &mut R) -> AppResult<Vec<DrawAssignment>> {
    if group_ids.is_empty() {
        return Err(AppError::NoGroups);
    }

    let mut shuffled = group_ids.to_vec();
    shuffled.shuffle(rng);

    Ok(shuffled
        .into_iter()
        .enumerate()
        .map(|(index, group_id)| DrawAssignment {
            group_id,
            draw_order: index as i32 + 1,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_draw_orders_form_a_permutation() {
        let ids: Vec<i64> = (10..22).collect();
        let draw = draw_permutation(&ids, &mut StdRng::seed_from_u64(42)).unwrap();

        let mut orders: Vec<i32> = draw.iter().map(|a| a.draw_order).collect();
        orders.sort();
        assert_eq!(orders, (1..=12).collect::<Vec<_>>());

        let mut drawn_ids: Vec<i64> = draw.iter().map(|a| a.group_id).collect();
        drawn_ids.sort();
        assert_eq!(drawn_ids, ids);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let ids: Vec<i64> = (1..=8).collect();
        let first = draw_permutation(&ids, &mut StdRng::seed_from_u64(2024)).unwrap();
        let second = draw_permutation(&ids, &mut StdRng::seed_from_u64(2024)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_single_group_draws_first() {
        let draw = draw_permutation(&[7], &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(draw, vec![DrawAssignment { group_id: 7, draw_order: 1 }]);
    }

    #[test]
    fn test_no_groups_is_a_configuration_error() {
        let err = draw_permutation(&[], &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err.error_code(), "NO_GROUPS");
    }
}
