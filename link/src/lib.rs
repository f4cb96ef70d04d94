//! Connectivity-aware delivery shared by the edge and cloud agents.
//!
//! A [`Link`] owns the state both execution contexts of an agent touch: the
//! offline buffer, the liveness tracker and the probe latch. The cadence task
//! calls [`Link::tick`]; the handler task feeds transport events into
//! [`Link::handle`].

pub mod buffer;
pub mod config;
pub mod link;
pub mod liveness;
pub mod peer;
pub mod run;

pub use buffer::{DrainReport, OfflineBuffer};
pub use crate::config::{LinkConfig, LinkSettings, MqttSettings};
pub use link::{Link, TickOutcome};
pub use liveness::{Liveness, LivenessTracker, ProbeLatch};
pub use peer::Peer;
