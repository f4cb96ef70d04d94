use std::cmp::Ordering;
use telemetry::TelemetryRecord;

/// A telemetry record keyed by its negated timestamp.
///
/// The smallest key is the newest record. `Ord` is reversed on the key so a
/// max-heap of these yields the newest record first. Equal timestamps compare
/// equal and come out in unspecified order.
#[derive(Debug, Clone)]
pub struct PrioritizedRecord {
    pub priority: f64,
    pub record: TelemetryRecord,
}

impl PrioritizedRecord {
    pub fn new(record: TelemetryRecord) -> Self {
        Self {
            priority: -record.timestamp,
            record,
        }
    }
}

impl PartialEq for PrioritizedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrioritizedRecord {}

impl PartialOrd for PrioritizedRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority)
    }
}
