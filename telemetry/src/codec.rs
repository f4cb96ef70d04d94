//! JSON encoding of the records exchanged between the agents.
//!
//! Records travel as flat objects whose keys are the struct field names.

use crate::record::{RecommendationRecord, TelemetryRecord};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode<T: Serialize>(record: &T) -> String {
    // Flat structs of f64 fields always serialize.
    serde_json::to_string(record).unwrap_or_default()
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, PayloadError> {
    Ok(serde_json::from_slice(payload)?)
}

pub fn decode_telemetry(payload: &[u8]) -> Result<TelemetryRecord, PayloadError> {
    decode(payload)
}

pub fn decode_recommendation(payload: &[u8]) -> Result<RecommendationRecord, PayloadError> {
    decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_telemetry_field_names() {
        let record = TelemetryRecord::new(71.2, 80.4, 2750.0, 4600.0, 1_700_000_010.5);
        let value: Value = serde_json::from_str(&encode(&record)).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["cpu_freq", "cpu_temp", "gpu_freq", "gpu_temp", "timestamp"]);
        assert_eq!(obj["cpu_temp"], 80.4);
    }

    #[test]
    fn test_decode_recommendation_from_peer() {
        let payload = br#"{"cpu_offset_factor": -0.05, "gpu_offset_factor": 0, "timestamp": 1700000020.0}"#;
        let record = decode_recommendation(payload).unwrap();

        assert_eq!(record.cpu_offset_factor, -0.05);
        assert_eq!(record.gpu_offset_factor, 0.0);
        assert_eq!(record.timestamp, 1_700_000_020.0);
    }

    #[test]
    fn test_decode_missing_field() {
        let payload = br#"{"gpu_temp": 70.0, "cpu_temp": 80.0, "timestamp": 1.0}"#;
        assert!(matches!(
            decode_telemetry(payload),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_probe_sentinel_is_malformed() {
        assert!(matches!(
            decode_recommendation(crate::PROBE_PAYLOAD.as_bytes()),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8_is_malformed() {
        assert!(matches!(
            decode_telemetry(&[0xff, 0xfe, 0x00]),
            Err(PayloadError::Malformed(_))
        ));
    }
}
