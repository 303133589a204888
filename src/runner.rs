//! Threaded worker runner.
//!
//! One OS thread per worker. Each thread owns its stream and hands its batch
//! back through a single-use channel; the runner waits on every worker before
//! building the aggregate.

use crate::error::{Error, Result};
use crate::seed::Seed;
use crate::splitter::WorkAssignment;
use crate::stream::{Algorithm, SampleStream};
use crossbeam_channel::bounded;
use std::thread;
use tracing::debug;

/// Samples drawn by one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerResult {
    pub worker: usize,
    pub seed: Seed,
    pub samples: Vec<f64>,
}

/// Per-worker batches plus their concatenation in worker-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    per_worker: Vec<WorkerResult>,
    combined: Vec<f64>,
}

impl AggregateResult {
    /// `per_worker` must already be in ascending worker order.
    pub fn from_workers(per_worker: Vec<WorkerResult>) -> Self {
        let combined = per_worker
            .iter()
            .flat_map(|w| w.samples.iter().copied())
            .collect();
        AggregateResult {
            per_worker,
            combined,
        }
    }

    pub fn per_worker(&self) -> &[WorkerResult] {
        &self.per_worker
    }

    pub fn combined(&self) -> &[f64] {
        &self.combined
    }
}

/// Seeds for every worker, `base_seed + i`, derived before anything runs.
pub fn worker_seeds(assignment: &WorkAssignment, base_seed: Seed) -> Result<Vec<Seed>> {
    (0..assignment.n_workers())
        .map(|worker| {
            base_seed
                .offset(worker)
                .ok_or_else(|| Error::GenerationFailure {
                    worker,
                    reason: format!("seed {base_seed} + {worker} overflows"),
                })
        })
        .collect()
}

/// Body of a single worker: draws exactly `count` samples.
pub fn generate(worker: usize, seed: Seed, count: usize, algorithm: Algorithm) -> WorkerResult {
    let samples = SampleStream::with_algorithm(seed, algorithm)
        .take(count)
        .collect();

    WorkerResult {
        worker,
        seed,
        samples,
    }
}

pub fn run(assignment: &WorkAssignment, base_seed: Seed, algorithm: Algorithm) -> Result<AggregateResult> {
    let seeds = worker_seeds(assignment, base_seed)?;
    run_with(assignment, seeds, move |worker, seed, count| {
        Ok(generate(worker, seed, count, algorithm))
    })
}

fn run_with<F>(assignment: &WorkAssignment, seeds: Vec<Seed>, body: F) -> Result<AggregateResult>
where
    F: Fn(usize, Seed, usize) -> Result<WorkerResult> + Clone + Send + 'static,
{
    let mut workers = Vec::with_capacity(assignment.n_workers());
    for ((worker_id, samples), seed) in assignment.iter().zip(seeds) {
        let (tx, rx) = bounded(1);
        let body = body.clone();

        let handle = thread::Builder::new()
            .name(format!("worker-{worker_id}"))
            .spawn(move || {
                debug!(worker = worker_id, %seed, samples, "worker started");
                // the receiver only goes away if the runner itself is gone
                let _ = tx.send(body(worker_id, seed, samples));
            })
            .map_err(|e| Error::GenerationFailure {
                worker: worker_id,
                reason: format!("failed to spawn thread: {e}"),
            })?;

        workers.push((worker_id, rx, handle));
    }

    // wait for every worker, even after a failure
    let mut results = Vec::with_capacity(workers.len());
    let mut failure = None;
    for (worker_id, rx, handle) in workers {
        // a worker that returns has always sent, so a missing batch means a panic
        let outcome = match (rx.recv(), handle.join()) {
            (Ok(result), Ok(())) => result,
            _ => Err(Error::GenerationFailure {
                worker: worker_id,
                reason: "worker panicked".to_string(),
            }),
        };

        match outcome {
            Ok(result) => {
                debug!(worker = worker_id, samples = result.samples.len(), "worker finished");
                results.push(result);
            }
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(AggregateResult::from_workers(results)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::split;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_combined_is_ordered_concatenation() {
        let assignment = split(11, 3).unwrap();
        let aggregate = run(&assignment, Seed::Int(101), Algorithm::Mt19937).unwrap();

        assert_eq!(aggregate.per_worker().len(), 3);
        assert_eq!(aggregate.combined().len(), 11);

        let concatenated: Vec<f64> = aggregate
            .per_worker()
            .iter()
            .flat_map(|w| w.samples.clone())
            .collect();
        assert_eq!(aggregate.combined(), concatenated.as_slice());

        for (i, worker) in aggregate.per_worker().iter().enumerate() {
            assert_eq!(worker.worker, i);
            assert_eq!(worker.samples.len(), assignment.counts()[i]);
        }
    }

    #[test]
    fn test_worker_streams_use_offset_seeds() {
        let assignment = split(8, 2).unwrap();
        let aggregate = run(&assignment, Seed::Int(101), Algorithm::Mt19937).unwrap();

        let expected_0: Vec<f64> = SampleStream::new(Seed::Int(101)).take(4).collect();
        let expected_1: Vec<f64> = SampleStream::new(Seed::Int(102)).take(4).collect();
        assert_eq!(aggregate.per_worker()[0].samples, expected_0);
        assert_eq!(aggregate.per_worker()[1].samples, expected_1);
        assert_eq!(aggregate.per_worker()[1].seed, Seed::Int(102));
    }

    #[test]
    fn test_run_is_deterministic() {
        let assignment = split(1_000, 7).unwrap();
        for algorithm in [Algorithm::Mt19937, Algorithm::ChaCha8] {
            let a = run(&assignment, Seed::Float(3.5), algorithm).unwrap();
            let b = run(&assignment, Seed::Float(3.5), algorithm).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zero_count_workers_return_empty_batches() {
        let assignment = split(1, 3).unwrap();
        let aggregate = run(&assignment, Seed::Int(0), Algorithm::Mt19937).unwrap();
        assert_eq!(aggregate.per_worker()[0].samples.len(), 1);
        assert!(aggregate.per_worker()[1].samples.is_empty());
        assert!(aggregate.per_worker()[2].samples.is_empty());
        assert_eq!(aggregate.combined().len(), 1);
    }

    #[test]
    fn test_seed_overflow_fails_before_generation() {
        let assignment = split(4, 2).unwrap();
        let err = run(&assignment, Seed::Int(i128::MAX), Algorithm::Mt19937).unwrap_err();
        assert!(matches!(err, Error::GenerationFailure { worker: 1, .. }));
    }

    #[test]
    fn test_wide_seed_workers_draw_distinct_streams() {
        let assignment = split(4, 2).unwrap();
        let aggregate = run(&assignment, Seed::Int(1 << 64), Algorithm::Mt19937).unwrap();
        assert_eq!(aggregate.per_worker()[1].seed, Seed::Int((1 << 64) + 1));
        assert_ne!(aggregate.per_worker()[0].samples, aggregate.per_worker()[1].samples);
    }

    #[test]
    fn test_panicking_worker_fails_run_after_joining_others() {
        let assignment = split(40, 4).unwrap();
        let seeds = worker_seeds(&assignment, Seed::Int(1)).unwrap();
        let finished = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&finished);
        let err = run_with(&assignment, seeds, move |worker, seed, count| {
            if worker == 2 {
                panic!("worker 2 gave up");
            }
            std::thread::sleep(Duration::from_millis(20));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(generate(worker, seed, count, Algorithm::Mt19937))
        })
        .unwrap_err();

        assert!(matches!(err, Error::GenerationFailure { worker: 2, .. }));
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failing_worker_error_is_returned() {
        let assignment = split(9, 3).unwrap();
        let seeds = worker_seeds(&assignment, Seed::Int(1)).unwrap();

        let err = run_with(&assignment, seeds, |worker, seed, count| {
            if worker >= 1 {
                return Err(Error::GenerationFailure {
                    worker,
                    reason: "out of samples".to_string(),
                });
            }
            Ok(generate(worker, seed, count, Algorithm::Mt19937))
        })
        .unwrap_err();

        // the lowest failing index wins
        match err {
            Error::GenerationFailure { worker, reason } => {
                assert_eq!(worker, 1);
                assert_eq!(reason, "out of samples");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
