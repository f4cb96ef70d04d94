/// What the tracker knows about the peer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Liveness {
    /// Nothing heard since start.
    Unseen,
    /// Reset by a (re)connect or a liveness probe; counts as heard at `granted_at`.
    Grace { granted_at: f64 },
    /// Last inbound record carried this timestamp.
    Seen { last_seen: f64 },
}

/// Online/offline verdict derived from inbound traffic, independent of the
/// transport's own connection state.
///
/// Timestamps come from the peer's records, so clock drift between the agents
/// and network latency both skew the staleness.
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    state: Liveness,
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self {
            state: Liveness::Unseen,
        }
    }

    pub fn state(&self) -> Liveness {
        self.state
    }

    pub fn record_seen(&mut self, timestamp: f64) {
        self.state = Liveness::Seen {
            last_seen: timestamp,
        };
    }

    /// Forgets the last timestamp and grants one staleness window starting at `now`.
    pub fn reset(&mut self, now: f64) {
        self.state = Liveness::Grace { granted_at: now };
    }

    /// Seconds since the peer was last heard from; infinite if never.
    pub fn staleness(&self, now: f64) -> f64 {
        match self.state {
            Liveness::Unseen => f64::INFINITY,
            Liveness::Grace { granted_at } => now - granted_at,
            Liveness::Seen { last_seen } => now - last_seen,
        }
    }

    pub fn is_online(&self, now: f64, staleness_threshold: f64) -> bool {
        self.staleness(now) < staleness_threshold
    }
}

/// One-shot arm/disarm state of the liveness probe subscription.
#[derive(Debug, Default, Clone)]
pub struct ProbeLatch {
    armed: bool,
}

impl ProbeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the latch was not armed before.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    /// Returns `true` if a probe was expected.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
