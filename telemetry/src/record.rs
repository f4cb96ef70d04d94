use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// One sample of the edge node's sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub gpu_temp: f64,
    pub cpu_temp: f64,
    pub gpu_freq: f64,
    pub cpu_freq: f64,
    /// seconds since UNIX epoch
    pub timestamp: f64,
}

impl TelemetryRecord {
    pub fn new(gpu_temp: f64, cpu_temp: f64, gpu_freq: f64, cpu_freq: f64, timestamp: f64) -> Self {
        Self {
            gpu_temp,
            cpu_temp,
            gpu_freq,
            cpu_freq,
            timestamp,
        }
    }

    /// Reads a single metric by name.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::GpuTemp => self.gpu_temp,
            Metric::CpuTemp => self.cpu_temp,
            Metric::GpuFreq => self.gpu_freq,
            Metric::CpuFreq => self.cpu_freq,
        }
    }
}

/// Tuning offsets computed by the cloud node.
///
/// The edge accumulates both offsets additively into its frequency factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub cpu_offset_factor: f64,
    pub gpu_offset_factor: f64,
    pub timestamp: f64,
}

impl RecommendationRecord {
    pub fn new(cpu_offset_factor: f64, gpu_offset_factor: f64, timestamp: f64) -> Self {
        Self {
            cpu_offset_factor,
            gpu_offset_factor,
            timestamp,
        }
    }
}

/// The four metrics carried by a [`TelemetryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    GpuTemp,
    CpuTemp,
    GpuFreq,
    CpuFreq,
}

impl Metric {
    /// Field name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::GpuTemp => "gpu_temp",
            Metric::CpuTemp => "cpu_temp",
            Metric::GpuFreq => "gpu_freq",
            Metric::CpuFreq => "cpu_freq",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpu_temp" => Ok(Metric::GpuTemp),
            "cpu_temp" => Ok(Metric::CpuTemp),
            "gpu_freq" => Ok(Metric::GpuFreq),
            "cpu_freq" => Ok(Metric::CpuFreq),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}
