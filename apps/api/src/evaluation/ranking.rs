use uuid::Uuid;

/// Position of one evaluation among completed evaluations of the same job.
///
/// Sorting is stable, so tied scores keep their pool order. An evaluation that
/// is not yet in the pool is ranked after every strictly greater score only;
/// ties never push it down.
pub fn rank_candidate(this_score: f64, this_id: Uuid, pool: &[(Uuid, f64)]) -> u32 {
    let mut sorted: Vec<(Uuid, f64)> = pool.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    if let Some(position) = sorted.iter().position(|(id, _)| *id == this_id) {
        return position as u32 + 1;
    }
    sorted.iter().filter(|(_, score)| *score > this_score).count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(scores: &[f64]) -> Vec<(Uuid, f64)> {
        scores.iter().map(|s| (Uuid::new_v4(), *s)).collect()
    }

    #[test]
    fn test_new_entry_ranked_by_strictly_greater() {
        let pool = pool(&[90.0, 80.0, 80.0, 60.0]);
        assert_eq!(rank_candidate(85.0, Uuid::new_v4(), &pool), 2);
    }

    #[test]
    fn test_ties_not_counted_against_new_entry() {
        let pool = pool(&[90.0, 80.0, 80.0, 60.0]);
        assert_eq!(rank_candidate(80.0, Uuid::new_v4(), &pool), 2);
        assert_eq!(rank_candidate(95.0, Uuid::new_v4(), &pool), 1);
        assert_eq!(rank_candidate(10.0, Uuid::new_v4(), &pool), 5);
    }

    #[test]
    fn test_existing_entry_uses_sorted_position() {
        let pool = pool(&[60.0, 90.0, 80.0]);
        let id = pool[0].0;
        assert_eq!(rank_candidate(60.0, id, &pool), 3);
    }

    #[test]
    fn test_stable_order_for_ties() {
        let pool = pool(&[70.0, 70.0, 70.0]);
        assert_eq!(rank_candidate(70.0, pool[0].0, &pool), 1);
        assert_eq!(rank_candidate(70.0, pool[2].0, &pool), 3);
    }

    #[test]
    fn test_empty_pool_ranks_first() {
        assert_eq!(rank_candidate(0.0, Uuid::new_v4(), &[]), 1);
    }
}
