//! Deterministic parallel Monte Carlo sampling.
//!
//! A run has three phases:
//! 1. setup: parse and validate the JSON configuration ([`load_input`])
//! 2. map: split the samples over workers and draw them in parallel
//!    ([`generate_results`])
//! 3. reduce: summary statistics per worker and for the combined series
//!    ([`summarize`])
//!
//! For a fixed configuration the output is bit-identical across runs.

pub mod cli;
pub mod config;
pub mod error;
pub mod mt19937;
pub mod reducer;
pub mod runner;
pub mod seed;
pub mod splitter;
pub mod stream;
pub mod summary;

pub use config::Config;
pub use error::{Error, Result};
pub use reducer::{reduce, EmptySeriesError, StatsRecord};
pub use runner::{AggregateResult, WorkerResult};
pub use seed::Seed;
pub use splitter::{split, WorkAssignment};
pub use stream::{Algorithm, SampleStream};
pub use summary::{summarize, SummaryOutput, TOTAL_LABEL};

use tracing::info;

pub fn load_input(input: &str) -> Result<Config> {
    info!("loading JSON data");
    let config = Config::from_json(input)?;
    info!(title = %config.title, "input is valid");
    Ok(config)
}

/// Map phase on OS threads.
pub fn generate_results(config: &Config) -> Result<AggregateResult> {
    info!(
        workers = config.n_workers,
        samples = config.n_sims,
        seed = %config.random_seed,
        generator = ?config.generator,
        "assigning tasks to workers"
    );
    let assignment = split(config.n_sims, config.n_workers)?;
    let aggregate = runner::run(&assignment, config.random_seed, config.generator)?;
    info!("mapping finished");
    Ok(aggregate)
}

pub fn compute(config: &Config) -> Result<SummaryOutput> {
    let aggregate = generate_results(config)?;
    let summary = summarize(&config.title, &aggregate, config.threshold)?;
    info!(series = summary.statistics.len(), "reduction finished");
    Ok(summary)
}

/// Setup, map and reduce for a raw JSON configuration.
pub fn full_computation(input: &str) -> Result<SummaryOutput> {
    let config = load_input(input)?;
    compute(&config)
}
