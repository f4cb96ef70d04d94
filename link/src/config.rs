use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Timing parameters shared by the producer loop and the liveness check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    /// Interval between producer ticks.
    pub cadence: Duration,
    /// The peer is online while staleness stays below `cadence × multiplier`.
    pub staleness_multiplier: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(10),
            staleness_multiplier: 2.0,
        }
    }
}

impl LinkConfig {
    pub fn new(cadence: Duration, staleness_multiplier: f64) -> Self {
        Self {
            cadence,
            staleness_multiplier,
        }
    }

    /// Staleness threshold in seconds.
    pub fn staleness_threshold(&self) -> f64 {
        self.cadence.as_secs_f64() * self.staleness_multiplier
    }
}

/// `[mqtt]` section of an agent's configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    pub client_prefix: String,
}

fn default_keep_alive() -> u64 {
    60
}

fn default_reconnect_delay() -> u64 {
    1000
}

impl MqttSettings {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// `[link]` section of an agent's configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSettings {
    #[serde(default = "default_cadence")]
    pub cadence_seconds: f64,
    #[serde(default = "default_multiplier")]
    pub staleness_multiplier: f64,
}

fn default_cadence() -> f64 {
    10.0
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            cadence_seconds: default_cadence(),
            staleness_multiplier: default_multiplier(),
        }
    }
}

impl LinkSettings {
    /// Both values must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        positive("link.cadence_seconds", self.cadence_seconds)?;
        positive("link.staleness_multiplier", self.staleness_multiplier)
    }
}

fn positive(key: &str, value: f64) -> Result<(), config::ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(config::ConfigError::Message(format!(
            "{key} must be a positive number, got {value}"
        )))
    }
}

impl TryFrom<&LinkSettings> for LinkConfig {
    type Error = config::ConfigError;

    fn try_from(settings: &LinkSettings) -> Result<Self, Self::Error> {
        settings.validate()?;
        let cadence = Duration::try_from_secs_f64(settings.cadence_seconds)
            .map_err(|e| config::ConfigError::Message(format!("link.cadence_seconds: {e}")))?;
        if cadence.is_zero() {
            return Err(config::ConfigError::Message(
                "link.cadence_seconds is below one nanosecond".to_string(),
            ));
        }

        Ok(LinkConfig::new(cadence, settings.staleness_multiplier))
    }
}

/// Loads a configuration file (TOML, extension optional), then lets
/// `<PREFIX>__SECTION__KEY` environment variables override it. A `.env` file
/// in the working directory is read first if present.
pub fn load<T: DeserializeOwned>(path: &str, env_prefix: &str) -> Result<T, config::ConfigError> {
    let _ = dotenvy::dotenv();

    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
