use crate::sensors::SensorModel;
use link::Peer;
use log::info;
use rand::{SeedableRng, rngs::StdRng};
use std::sync::{Mutex, MutexGuard, PoisonError};
use telemetry::{PayloadError, RECOMMENDATION_TOPIC, TELEMETRY_TOPIC, codec};

/// Edge side: samples sensors out, applies recommendations in.
pub struct EdgePeer {
    sensors: Mutex<SensorModel>,
    rng: Mutex<StdRng>,
}

impl Default for EdgePeer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgePeer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            sensors: Mutex::new(SensorModel::new()),
            rng: Mutex::new(rng),
        }
    }

    fn sensors(&self) -> MutexGuard<'_, SensorModel> {
        self.sensors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current sensor model.
    pub fn model(&self) -> SensorModel {
        self.sensors().clone()
    }
}

impl Peer for EdgePeer {
    fn outbound_topic(&self) -> &'static str {
        TELEMETRY_TOPIC
    }

    fn inbound_topic(&self) -> &'static str {
        RECOMMENDATION_TOPIC
    }

    fn produce(&self, now: f64) -> Option<String> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let record = self.sensors().sample(&mut *rng, now);
        info!("{:?}", record);
        Some(codec::encode(&record))
    }

    fn consume(&self, payload: &[u8]) -> Result<f64, PayloadError> {
        let recommendation = codec::decode_recommendation(payload)?;

        let mut sensors = self.sensors();
        sensors.factors.apply(&recommendation);
        info!(
            "Applied recommendation, factors now cpu={:.2} gpu={:.2}",
            sensors.factors.cpu, sensors.factors.gpu
        );

        Ok(recommendation.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::RecommendationRecord;

    #[test]
    fn test_produce_encodes_telemetry() {
        let peer = EdgePeer::with_rng(StdRng::seed_from_u64(3));
        let payload = peer.produce(100.0).unwrap();
        let record = codec::decode_telemetry(payload.as_bytes()).unwrap();

        assert_eq!(record.timestamp, 100.0);
        assert_eq!(record.gpu_freq, 2750.0);
    }

    #[test]
    fn test_consume_applies_offsets() {
        let peer = EdgePeer::with_rng(StdRng::seed_from_u64(3));
        let payload = codec::encode(&RecommendationRecord::new(0.05, -0.05, 77.0));

        assert_eq!(peer.consume(payload.as_bytes()).unwrap(), 77.0);
        assert!((peer.model().factors.cpu - 1.05).abs() < 1e-12);
        assert!((peer.model().factors.gpu - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_consume_rejects_telemetry_payload() {
        let peer = EdgePeer::default();
        let payload = br#"{"gpu_temp": 1, "cpu_temp": 1, "gpu_freq": 1, "cpu_freq": 1, "timestamp": 1}"#;

        assert!(peer.consume(payload).is_err());
        assert_eq!(peer.model().factors, crate::OffsetFactors::default());
    }
}
