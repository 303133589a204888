//! Run configuration.
//!
//! Input arrives as a JSON object:
//!
//! ```json
//! {"title": "demo", "n_workers": 5, "random_seed": 101, "n_sims": 20, "threshold": 0.5}
//! ```
//!
//! `threshold` defaults to 0 and `generator` to `"mt19937"`. The object is
//! checked once here; everything downstream trusts the resulting [`Config`].

use crate::error::{Error, Result};
use crate::seed::Seed;
use crate::stream::Algorithm;
use serde::Deserialize;
use std::path::Path;

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Label copied into the summary
    pub title: String,
    /// Number of workers, at least one
    pub n_workers: usize,
    /// Base seed; worker `i` uses `random_seed + i`
    pub random_seed: Seed,
    /// Total samples across all workers
    pub n_sims: usize,
    /// Lower bound (inclusive) for `numof_samples_thresh`
    pub threshold: f64,
    pub generator: Algorithm,
}

/// Shape of the JSON input before range checks.
#[derive(Debug, Deserialize)]
struct RawConfig {
    title: String,
    n_workers: i64,
    random_seed: Seed,
    n_sims: i64,
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default)]
    generator: Algorithm,
}

fn default_threshold() -> f64 {
    0.0
}

impl Config {
    pub fn new(title: impl Into<String>, n_workers: usize, random_seed: Seed, n_sims: usize) -> Result<Self> {
        if n_workers == 0 {
            return Err(Error::InvalidConfiguration(
                "n_workers must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            title: title.into(),
            n_workers,
            random_seed,
            n_sims,
            threshold: default_threshold(),
            generator: Algorithm::default(),
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_generator(mut self, generator: Algorithm) -> Self {
        self.generator = generator;
        self
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(input).map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        Config::try_from(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfiguration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Config::from_json(&input)
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        if raw.n_workers < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "n_workers must be at least 1, got {}",
                raw.n_workers
            )));
        }
        if raw.n_sims < 0 {
            return Err(Error::InvalidConfiguration(format!(
                "n_sims must not be negative, got {}",
                raw.n_sims
            )));
        }
        if !raw.threshold.is_finite() {
            return Err(Error::InvalidConfiguration(
                "threshold must be finite".to_string(),
            ));
        }

        let n_workers = usize::try_from(raw.n_workers)
            .map_err(|_| Error::InvalidConfiguration("n_workers is too large".to_string()))?;
        let n_sims = usize::try_from(raw.n_sims)
            .map_err(|_| Error::InvalidConfiguration("n_sims is too large".to_string()))?;

        Ok(Config::new(raw.title, n_workers, raw.random_seed, n_sims)?
            .with_threshold(raw.threshold)
            .with_generator(raw.generator))
    }
}
