pub mod codec;
pub mod record;

pub use codec::PayloadError;
pub use record::{Metric, RecommendationRecord, TelemetryRecord};

use chrono::Utc;

/// Edge → cloud channel carrying [`TelemetryRecord`]s.
pub const TELEMETRY_TOPIC: &str = "environment/telemetry";
/// Cloud → edge channel carrying [`RecommendationRecord`]s.
pub const RECOMMENDATION_TOPIC: &str = "environment/recommendation";
/// Control channel for one-shot liveness probes.
pub const CONNECTION_TOPIC: &str = "environment/connection";
/// Sentinel published on [`CONNECTION_TOPIC`].
pub const PROBE_PAYLOAD: &str = "online";

/// Seconds since the UNIX epoch, with sub-second precision.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
