pub mod policy;
pub mod prioritized;

pub use policy::{HIGH_THRESHOLD, LOW_THRESHOLD, OFFSET_STEP, offset_for_mean};
pub use prioritized::PrioritizedRecord;

use log::debug;
use std::collections::BinaryHeap;
use telemetry::{Metric, RecommendationRecord, TelemetryRecord};
use thiserror::Error;

/// Number of most recent records a recommendation looks at.
pub const WINDOW_SIZE: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum AggregatorError {
    #[error("no telemetry received yet")]
    Empty,
}

/// Telemetry ordered newest-first.
///
/// By default every record is kept forever. [`Aggregator::with_retention`]
/// bounds the structure by evicting the oldest records.
#[derive(Debug, Default)]
pub struct Aggregator {
    heap: BinaryHeap<PrioritizedRecord>,
    retention: Option<usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `retention` records (at least one window's worth).
    pub fn with_retention(retention: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            retention: Some(retention.max(WINDOW_SIZE)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, record: TelemetryRecord) {
        self.heap.push(PrioritizedRecord::new(record));

        if let Some(retention) = self.retention {
            if self.heap.len() > retention {
                self.evict_oldest(retention);
            }
        }
    }

    fn evict_oldest(&mut self, keep: usize) {
        // ascending order puts the oldest records first
        let mut sorted = std::mem::take(&mut self.heap).into_sorted_vec();
        let evicted = sorted.len() - keep;
        sorted.drain(..evicted);
        self.heap = sorted.into();
        debug!("Evicted {} stale telemetry records", evicted);
    }

    /// The `n` most recent records, newest first, without removing them.
    ///
    /// Selection is linear in the number of held records; only the `n`
    /// selected ones are sorted.
    pub fn window(&self, n: usize) -> Vec<&TelemetryRecord> {
        if n == 0 {
            return Vec::new();
        }

        let newest_first = |a: &&PrioritizedRecord, b: &&PrioritizedRecord| b.cmp(a);
        let mut records: Vec<&PrioritizedRecord> = self.heap.iter().collect();
        if records.len() > n {
            records.select_nth_unstable_by(n - 1, newest_first);
            records.truncate(n);
        }
        records.sort_unstable_by(newest_first);
        records.into_iter().map(|p| &p.record).collect()
    }

    /// Mean of `metric` over the current window.
    pub fn window_mean(&self, metric: Metric) -> Result<f64, AggregatorError> {
        let window = self.window(WINDOW_SIZE);
        if window.is_empty() {
            return Err(AggregatorError::Empty);
        }

        let sum: f64 = window.iter().map(|r| r.metric(metric)).sum();
        Ok(sum / window.len() as f64)
    }

    /// Signed offset for `metric` according to the threshold policy.
    pub fn recommend(&self, metric: Metric) -> Result<f64, AggregatorError> {
        let mean = self.window_mean(metric)?;
        let offset = offset_for_mean(mean);
        debug!("{}: window mean {:.2} -> offset {}", metric, mean, offset);
        Ok(offset)
    }

    /// Builds the record the cloud sends back to the edge.
    pub fn recommendation(&self, now: f64) -> Result<RecommendationRecord, AggregatorError> {
        Ok(RecommendationRecord::new(
            self.recommend(Metric::CpuTemp)?,
            self.recommend(Metric::GpuTemp)?,
            now,
        ))
    }
}
