//! Summary record handed to output serialization.

use crate::error::{Error, Result};
use crate::reducer::{reduce, StatsRecord};
use crate::runner::AggregateResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label of the combined series in [`SummaryOutput::statistics`].
pub const TOTAL_LABEL: &str = "Total";

pub fn worker_label(worker: usize) -> String {
    format!("worker_{worker}")
}

/// Final result of a run.
///
/// `statistics` holds `worker_0` .. `worker_{n-1}` followed by `Total`, and
/// serializes in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub title: String,
    pub statistics: IndexMap<String, StatsRecord>,
}

impl SummaryOutput {
    pub fn worker(&self, worker: usize) -> Option<&StatsRecord> {
        self.statistics.get(&worker_label(worker))
    }

    pub fn total(&self) -> Option<&StatsRecord> {
        self.statistics.get(TOTAL_LABEL)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Reduces every worker series and then the combined series.
pub fn summarize(title: &str, aggregate: &AggregateResult, threshold: f64) -> Result<SummaryOutput> {
    let mut statistics = IndexMap::with_capacity(aggregate.per_worker().len() + 1);

    let series = aggregate
        .per_worker()
        .iter()
        .map(|w| (worker_label(w.worker), w.samples.as_slice()))
        .chain(std::iter::once((TOTAL_LABEL.to_string(), aggregate.combined())));

    for (label, samples) in series {
        let stats = reduce(samples, threshold).map_err(|_| Error::EmptySeries {
            label: label.clone(),
        })?;
        statistics.insert(label, stats);
    }

    Ok(SummaryOutput {
        title: title.to_string(),
        statistics,
    })
}
