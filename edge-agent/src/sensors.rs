//! Synthetic sensors standing in for real GPU/CPU probes.
//!
//! Every reading is scaled by the accumulated offset factors, so the
//! recommendations coming back from the cloud visibly steer the numbers.

use rand::Rng;
use telemetry::{RecommendationRecord, TelemetryRecord};

pub const GPU_BASE_FREQ: f64 = 2750.0;
pub const CPU_BASE_FREQ: f64 = 4600.0;

const GPU_BASE_TEMP: f64 = 70.0;
const CPU_BASE_TEMP: f64 = 80.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Multiplicative biases applied to every sensor reading.
///
/// Starts at 1.0 and only ever moves by adding recommended offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetFactors {
    pub gpu: f64,
    pub cpu: f64,
}

impl Default for OffsetFactors {
    fn default() -> Self {
        Self { gpu: 1.0, cpu: 1.0 }
    }
}

impl OffsetFactors {
    pub fn apply(&mut self, recommendation: &RecommendationRecord) {
        self.gpu += recommendation.gpu_offset_factor;
        self.cpu += recommendation.cpu_offset_factor;
    }
}

/// Virtual GPU/CPU sensors.
#[derive(Debug, Default, Clone)]
pub struct SensorModel {
    pub factors: OffsetFactors,
}

impl SensorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gpu_temp<R: Rng>(&self, rng: &mut R) -> f64 {
        round2((GPU_BASE_TEMP + rng.gen_range(-10.0..=20.0)) * self.factors.gpu)
    }

    pub fn cpu_temp<R: Rng>(&self, rng: &mut R) -> f64 {
        round2((CPU_BASE_TEMP + rng.gen_range(-10.0..=20.0)) * self.factors.cpu)
    }

    pub fn gpu_freq(&self) -> f64 {
        round2(GPU_BASE_FREQ * self.factors.gpu)
    }

    pub fn cpu_freq(&self) -> f64 {
        round2(CPU_BASE_FREQ * self.factors.cpu)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R, timestamp: f64) -> TelemetryRecord {
        TelemetryRecord::new(
            self.gpu_temp(rng),
            self.cpu_temp(rng),
            self.gpu_freq(),
            self.cpu_freq(),
            timestamp,
        )
    }
}
