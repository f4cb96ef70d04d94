use aggregator::Aggregator;
use link::{LinkSettings, MqttSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatorSettings {
    /// Maximum number of telemetry records kept; unlimited when absent.
    pub retention: Option<usize>,
}

impl AggregatorSettings {
    pub fn build(&self) -> Aggregator {
        match self.retention {
            Some(retention) => Aggregator::with_retention(retention),
            None => Aggregator::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttSettings,
    #[serde(default)]
    pub link: LinkSettings,
    #[serde(default)]
    pub aggregator: AggregatorSettings,
}

impl Config {
    /// Load configuration from a TOML file, with `CLOUD__` environment overrides.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let config: Self = link::config::load(path, "CLOUD")?;
        config.link.validate()?;
        Ok(config)
    }
}
