//! Tokio flavor of the worker runner.
//!
//! Workers run on the blocking pool and report through one oneshot channel
//! each. An optional deadline bounds the whole batch: once it passes, the
//! run fails and the outstanding receivers are dropped, which workers notice
//! between chunks and stop drawing.

use mc_sampler::runner::worker_seeds;
use mc_sampler::{
    split, summarize, AggregateResult, Algorithm, Config, Error, Result, SampleStream, Seed,
    SummaryOutput, WorkAssignment, WorkerResult,
};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

/// Samples drawn between checks for an abandoned run.
const CHUNK: usize = 4096;

fn draw(
    tx: oneshot::Sender<Result<WorkerResult>>,
    task_id: usize,
    seed: Seed,
    count: usize,
    algorithm: Algorithm,
) {
    debug!(worker = task_id, %seed, samples = count, "worker started");

    let mut stream = SampleStream::with_algorithm(seed, algorithm);
    let mut samples = Vec::with_capacity(count.min(CHUNK));
    while samples.len() < count {
        if tx.is_closed() {
            debug!(worker = task_id, "run abandoned, dropping batch");
            return;
        }
        let chunk = (count - samples.len()).min(CHUNK);
        samples.extend(stream.by_ref().take(chunk));
    }

    let _ = tx.send(Ok(WorkerResult {
        worker: task_id,
        seed,
        samples,
    }));
}

pub async fn run(
    assignment: &WorkAssignment,
    base_seed: Seed,
    algorithm: Algorithm,
    timeout: Option<Duration>,
) -> Result<AggregateResult> {
    let seeds = worker_seeds(assignment, base_seed)?;
    run_with(assignment, seeds, timeout, move |tx, task_id, seed, samples| {
        draw(tx, task_id, seed, samples, algorithm)
    })
    .await
}

async fn run_with<F>(
    assignment: &WorkAssignment,
    seeds: Vec<Seed>,
    timeout: Option<Duration>,
    body: F,
) -> Result<AggregateResult>
where
    F: Fn(oneshot::Sender<Result<WorkerResult>>, usize, Seed, usize) + Clone + Send + 'static,
{
    let deadline = timeout.map(|t| Instant::now() + t);

    let mut tasks = Vec::with_capacity(assignment.n_workers());
    for ((task_id, samples), seed) in assignment.iter().zip(seeds) {
        let (tx, rx) = oneshot::channel();
        let body = body.clone();
        let handle = task::spawn_blocking(move || body(tx, task_id, seed, samples));
        tasks.push((task_id, rx, handle));
    }

    let mut results = Vec::with_capacity(tasks.len());
    let mut failure = None;
    for (task_id, rx, handle) in tasks {
        let received = match deadline {
            Some(deadline) => match timeout_at(deadline, rx).await {
                Ok(received) => received,
                Err(_) => {
                    // remaining receivers drop on return
                    return Err(failure.unwrap_or(Error::GenerationFailure {
                        worker: task_id,
                        reason: "deadline exceeded".to_string(),
                    }));
                }
            },
            None => rx.await,
        };

        let outcome = match (received, handle.await) {
            (Ok(result), Ok(())) => result,
            (_, Err(e)) => Err(Error::GenerationFailure {
                worker: task_id,
                reason: format!("task failed: {e}"),
            }),
            (Err(_), Ok(())) => Err(Error::GenerationFailure {
                worker: task_id,
                reason: "task exited without delivering results".to_string(),
            }),
        };

        match outcome {
            Ok(result) => {
                debug!(worker = task_id, samples = result.samples.len(), "worker finished");
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

pub async fn compute(config: &Config, timeout: Option<Duration>) -> Result<SummaryOutput> {
    info!(
        workers = config.n_workers,
        samples = config.n_sims,
        seed = %config.random_seed,
        generator = ?config.generator,
        "assigning tasks to workers"
    );
    let assignment = split(config.n_sims, config.n_workers)?;
    let aggregate = run(&assignment, config.random_seed, config.generator, timeout).await?;
    info!("mapping finished");

    let summary = summarize(&config.title, &aggregate, config.threshold)?;
    info!(series = summary.statistics.len(), "reduction finished");
    Ok(summary)
}

pub async fn full_computation(input: &str, timeout: Option<Duration>) -> Result<SummaryOutput> {
    let config = mc_sampler::load_input(input)?;
    compute(&config, timeout).await
}
