//! Deterministic division of the total sample count across workers.

use crate::error::{Error, Result};

/// Per-worker sample counts, in worker-index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAssignment(Vec<usize>);

impl WorkAssignment {
    pub fn counts(&self) -> &[usize] {
        &self.0
    }

    pub fn n_workers(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

/// Splits `n_sims` samples over `n_workers` workers.
///
/// The first `n_sims % n_workers` workers take one extra sample, so no two
/// counts differ by more than one.
pub fn split(n_sims: usize, n_workers: usize) -> Result<WorkAssignment> {
    if n_workers == 0 {
        return Err(Error::InvalidConfiguration(
            "cannot split work across zero workers".to_string(),
        ));
    }

    let per_worker = n_sims / n_workers;
    let remainder = n_sims % n_workers;

    let counts = (0..n_workers)
        .map(|worker_id| {
            if worker_id < remainder {
                per_worker + 1
            } else {
                per_worker
            }
        })
        .collect();

    Ok(WorkAssignment(counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_front_loads_remainder() {
        assert_eq!(split(11, 3).unwrap().counts(), &[4, 4, 3]);
        assert_eq!(split(2, 2).unwrap().counts(), &[1, 1]);
        assert_eq!(split(100, 5).unwrap().counts(), &[20, 20, 20, 20, 20]);
    }

    #[test]
    fn test_split_fewer_samples_than_workers() {
        assert_eq!(split(2, 5).unwrap().counts(), &[1, 1, 0, 0, 0]);
        assert_eq!(split(0, 3).unwrap().counts(), &[0, 0, 0]);
    }

    #[test]
    fn test_split_zero_workers_is_rejected() {
        assert!(matches!(split(10, 0), Err(Error::InvalidConfiguration(_))));
    }

    proptest! {
        #[test]
        fn split_preserves_total_and_balance(n_sims in 0usize..100_000, n_workers in 1usize..64) {
            let assignment = split(n_sims, n_workers).unwrap();
            prop_assert_eq!(assignment.n_workers(), n_workers);
            prop_assert_eq!(assignment.total(), n_sims);

            let max = *assignment.counts().iter().max().unwrap();
            let min = *assignment.counts().iter().min().unwrap();
            prop_assert!(max - min <= 1);
            // larger counts never follow smaller ones
            prop_assert!(assignment.counts().windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
