use telemetry::PayloadError;

/// The agent-specific half of a [`Link`](crate::Link).
///
/// The edge produces telemetry and consumes recommendations; the cloud does the
/// opposite. Everything about buffering and liveness is shared.
pub trait Peer: Send + Sync {
    /// Topic this agent publishes its records on.
    fn outbound_topic(&self) -> &'static str;

    /// Topic carrying the peer's records.
    fn inbound_topic(&self) -> &'static str;

    /// Builds this tick's encoded record, or `None` if there is nothing to send.
    fn produce(&self, now: f64) -> Option<String>;

    /// Applies an inbound record and returns the timestamp it carries.
    fn consume(&self, payload: &[u8]) -> Result<f64, PayloadError>;

    /// Whether to publish the probe sentinel each time the broker accepts us.
    fn announces_presence(&self) -> bool {
        false
    }
}
