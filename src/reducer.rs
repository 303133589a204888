//! Summary statistics over a sample series.
//!
//! Every field is computed from the full series; nothing is trimmed or
//! cleaned. Extremes, median and the distinct count come from one sorted
//! copy, while the sum accumulates in series order so that it is
//! reproducible for a given series.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Statistics for one series (a single worker, or `Total`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Number of samples in the series
    pub numof_samples: usize,
    /// Samples greater than or equal to the threshold
    pub numof_samples_thresh: usize,
    pub max_result: f64,
    pub min_result: f64,
    /// Middle value, or the mean of the two middle values for even lengths
    pub median: f64,
    /// Number of unique values
    pub count_distinct: usize,
    pub sum: f64,
}

/// Extremes and median are undefined for a series with no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("series has no samples")]
pub struct EmptySeriesError;

pub fn reduce(series: &[f64], threshold: f64) -> Result<StatsRecord, EmptySeriesError> {
    if series.is_empty() {
        return Err(EmptySeriesError);
    }

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let median = if n % 2 == 0 {
        let mid = n / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[n / 2]
    };

    // equal values are adjacent once sorted; `==` also folds -0.0 into 0.0
    let count_distinct = 1 + sorted.windows(2).filter(|w| w[0] != w[1]).count();

    Ok(StatsRecord {
        numof_samples: n,
        numof_samples_thresh: series.iter().filter(|&&x| x >= threshold).count(),
        max_result: sorted[n - 1],
        min_result: sorted[0],
        median,
        count_distinct,
        sum: series.iter().sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_small_series() {
        let stats = reduce(&[1.0, 1.0, 2.0, 3.0, 4.0], 2.5).unwrap();
        assert_eq!(
            stats,
            StatsRecord {
                numof_samples: 5,
                numof_samples_thresh: 2,
                max_result: 4.0,
                min_result: 1.0,
                median: 2.0,
                count_distinct: 4,
                sum: 11.0,
            }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let stats = reduce(&[0.2, 0.5, 0.5, 0.9], 0.5).unwrap();
        assert_eq!(stats.numof_samples_thresh, 3);

        let stats = reduce(&[0.2, 0.5], 0.0).unwrap();
        assert_eq!(stats.numof_samples_thresh, 2);
    }

    #[test]
    fn test_even_length_median() {
        let stats = reduce(&[4.0, 1.0, 3.0, 2.0], 0.0).unwrap();
        assert!((stats.median - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unsorted_input() {
        let stats = reduce(&[0.9, 0.1, 0.5], 0.0).unwrap();
        assert_eq!(stats.min_result, 0.1);
        assert_eq!(stats.max_result, 0.9);
        assert_eq!(stats.median, 0.5);
    }

    #[test]
    fn test_single_sample() {
        let stats = reduce(&[0.42], 0.5).unwrap();
        assert_eq!(stats.numof_samples, 1);
        assert_eq!(stats.numof_samples_thresh, 0);
        assert_eq!(stats.median, 0.42);
        assert_eq!(stats.count_distinct, 1);
    }

    #[test]
    fn test_signed_zero_counts_once() {
        let stats = reduce(&[0.0, -0.0, 0.5], 0.0).unwrap();
        assert_eq!(stats.count_distinct, 2);
    }

    #[test]
    fn test_empty_series_is_reported() {
        assert_eq!(reduce(&[], 0.0), Err(EmptySeriesError));
    }
}
