use crate::{
    buffer::{DrainReport, OfflineBuffer},
    config::LinkConfig,
    liveness::{LivenessTracker, ProbeLatch},
    peer::Peer,
};
use log::{debug, info, warn};
use mqtt_client::{Transport, TransportEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use telemetry::{CONNECTION_TOPIC, PROBE_PAYLOAD};

/// What a producer tick did with its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published,
    Buffered,
    /// The peer had nothing to send.
    Skipped,
}

/// Delivery state of one agent, shared by its cadence and handler tasks.
///
/// Each resource sits behind its own lock; no operation needs two at once
/// except that draining holds the buffer lock while publishing.
pub struct Link<P, T> {
    peer: P,
    transport: Arc<T>,
    config: LinkConfig,
    buffer: Mutex<OfflineBuffer<String>>,
    liveness: Mutex<LivenessTracker>,
    probe: Mutex<ProbeLatch>,
}

fn lock<R>(mutex: &Mutex<R>) -> MutexGuard<'_, R> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P: Peer, T: Transport> Link<P, T> {
    pub fn new(peer: P, transport: Arc<T>, config: LinkConfig) -> Self {
        Self {
            peer,
            transport,
            config,
            buffer: Mutex::new(OfflineBuffer::new()),
            liveness: Mutex::new(LivenessTracker::new()),
            probe: Mutex::new(ProbeLatch::new()),
        }
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn buffered(&self) -> usize {
        lock(&self.buffer).len()
    }

    pub fn liveness(&self) -> LivenessTracker {
        lock(&self.liveness).clone()
    }

    pub fn probe_armed(&self) -> bool {
        lock(&self.probe).is_armed()
    }

    pub fn is_online(&self, now: f64) -> bool {
        lock(&self.liveness).is_online(now, self.config.staleness_threshold())
    }

    /// One producer step: build a record, then publish it or buffer it.
    ///
    /// A failed publish is buffered, never retried within the same tick.
    pub fn tick(&self, now: f64) -> TickOutcome {
        let (staleness, online) = {
            let liveness = lock(&self.liveness);
            (
                liveness.staleness(now),
                liveness.is_online(now, self.config.staleness_threshold()),
            )
        };
        debug!("delta: {:.2}s", staleness);

        let Some(payload) = self.peer.produce(now) else {
            debug!("Nothing to send this tick");
            return TickOutcome::Skipped;
        };

        if self.transport.is_connected() && online {
            // backlog goes out ahead of the fresh record
            self.drain();

            match self.transport.publish(self.peer.outbound_topic(), &payload) {
                Ok(()) => TickOutcome::Published,
                Err(e) => {
                    warn!("Failed to send data: {}", e);
                    lock(&self.buffer).push(payload);
                    TickOutcome::Buffered
                }
            }
        } else {
            info!("Offline (delta {:.1}s), buffering", staleness);
            lock(&self.buffer).push(payload);
            self.arm_probe();
            TickOutcome::Buffered
        }
    }

    /// Reacts to one transport event. Never fails; bad input is logged and dropped.
    pub fn handle(&self, event: TransportEvent, now: f64) {
        match event {
            TransportEvent::Connected => self.on_connected(now),
            TransportEvent::ConnectionRefused { reason } => {
                warn!("Failed to connect, broker refused: {}", reason)
            }
            TransportEvent::Disconnected { reason } => {
                warn!("Disconnected from MQTT broker: {}", reason)
            }
            TransportEvent::Acknowledged { pkid } => debug!("Data published (pkid {})", pkid),
            TransportEvent::Message { topic, payload } => {
                if topic == CONNECTION_TOPIC {
                    self.on_probe(now);
                } else if topic == self.peer.inbound_topic() {
                    self.on_record(&topic, &payload);
                } else {
                    debug!("Ignoring message on unexpected topic {}", topic);
                }
            }
        }
    }

    /// Publishes every buffered record once; failures stay buffered.
    pub fn drain(&self) -> DrainReport {
        let mut buffer = lock(&self.buffer);
        if buffer.is_empty() {
            return DrainReport::default();
        }

        info!("Sending backlog of {} messages", buffer.len());
        let topic = self.peer.outbound_topic();
        buffer.drain_all(|payload| self.transport.publish(topic, payload))
    }

    /// Subscribes to the probe channel so a silent peer can announce itself.
    pub fn arm_probe(&self) {
        if lock(&self.probe).arm() {
            if let Err(e) = self.transport.subscribe(CONNECTION_TOPIC) {
                warn!("Could not subscribe to {}: {}", CONNECTION_TOPIC, e);
            }
        }
    }

    fn on_connected(&self, now: f64) {
        info!("Connected to MQTT broker");

        if let Err(e) = self.transport.subscribe(self.peer.inbound_topic()) {
            warn!("Could not subscribe to {}: {}", self.peer.inbound_topic(), e);
        }
        if lock(&self.probe).is_armed() {
            if let Err(e) = self.transport.subscribe(CONNECTION_TOPIC) {
                warn!("Could not subscribe to {}: {}", CONNECTION_TOPIC, e);
            }
        }
        if self.peer.announces_presence() {
            if let Err(e) = self.transport.publish(CONNECTION_TOPIC, PROBE_PAYLOAD) {
                warn!("Could not announce presence: {}", e);
            }
        }

        self.drain();
        lock(&self.liveness).reset(now);
    }

    fn on_probe(&self, now: f64) {
        if !lock(&self.probe).disarm() {
            debug!("Probe latch disarmed, ignoring probe");
            return;
        }

        info!("Peer announced itself online");
        if let Err(e) = self.transport.unsubscribe(CONNECTION_TOPIC) {
            warn!("Could not unsubscribe from {}: {}", CONNECTION_TOPIC, e);
        }
        lock(&self.liveness).reset(now);
    }

    fn on_record(&self, topic: &str, payload: &[u8]) {
        if !lock(&self.buffer).is_empty() {
            info!("Peer is back, flushing backlog first");
            self.drain();
        }

        match self.peer.consume(payload) {
            Ok(timestamp) => lock(&self.liveness).record_seen(timestamp),
            Err(e) => warn!("Dropping message on {}: {}", topic, e),
        }
    }
}
