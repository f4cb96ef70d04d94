use aggregator::Aggregator;
use link::Peer;
use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};
use telemetry::{PayloadError, RECOMMENDATION_TOPIC, TELEMETRY_TOPIC, codec};

/// Cloud side: aggregates telemetry in, sends recommendations out.
pub struct CloudPeer {
    aggregator: Mutex<Aggregator>,
}

impl Default for CloudPeer {
    fn default() -> Self {
        Self::new(Aggregator::new())
    }
}

impl CloudPeer {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Mutex::new(aggregator),
        }
    }

    pub fn aggregator(&self) -> MutexGuard<'_, Aggregator> {
        self.aggregator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Peer for CloudPeer {
    fn outbound_topic(&self) -> &'static str {
        RECOMMENDATION_TOPIC
    }

    fn inbound_topic(&self) -> &'static str {
        TELEMETRY_TOPIC
    }

    fn produce(&self, now: f64) -> Option<String> {
        match self.aggregator().recommendation(now) {
            Ok(record) => {
                info!("{:?}", record);
                Some(codec::encode(&record))
            }
            Err(e) => {
                debug!("Skipping recommendation: {}", e);
                None
            }
        }
    }

    fn consume(&self, payload: &[u8]) -> Result<f64, PayloadError> {
        let record = codec::decode_telemetry(payload)?;
        let timestamp = record.timestamp;
        info!("{:?}", record);

        self.aggregator().insert(record);
        Ok(timestamp)
    }

    fn announces_presence(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::TelemetryRecord;

    fn telemetry(timestamp: f64, cpu_temp: f64) -> Vec<u8> {
        codec::encode(&TelemetryRecord::new(68.0, cpu_temp, 2750.0, 4600.0, timestamp)).into_bytes()
    }

    #[test]
    fn test_no_recommendation_without_telemetry() {
        let peer = CloudPeer::default();
        assert_eq!(peer.produce(10.0), None);
    }

    #[test]
    fn test_consume_feeds_aggregator() {
        let peer = CloudPeer::default();

        assert_eq!(peer.consume(&telemetry(5.0, 80.0)).unwrap(), 5.0);
        assert_eq!(peer.aggregator().len(), 1);
    }

    #[test]
    fn test_produce_recommendation() {
        let peer = CloudPeer::default();
        peer.consume(&telemetry(1.0, 80.0)).unwrap();

        let payload = peer.produce(2.0).unwrap();
        let record = codec::decode_recommendation(payload.as_bytes()).unwrap();

        assert_eq!(record.cpu_offset_factor, -0.05);
        assert_eq!(record.gpu_offset_factor, 0.0);
        assert_eq!(record.timestamp, 2.0);
    }

    #[test]
    fn test_malformed_telemetry_is_not_stored() {
        let peer = CloudPeer::default();

        assert!(peer.consume(b"online").is_err());
        assert!(peer.aggregator().is_empty());
    }
}
