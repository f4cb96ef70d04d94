use link::{LinkSettings, MqttSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttSettings,
    #[serde(default)]
    pub link: LinkSettings,
}

impl Config {
    /// Load configuration from a TOML file, with `EDGE__` environment overrides.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let config: Self = link::config::load(path, "EDGE")?;
        config.link.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_bundled_config() {
        // tests run from the crate directory
        let config = Config::load("config").unwrap();

        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.client_prefix, "edge");
        assert_eq!(config.mqtt.keep_alive(), Duration::from_secs(60));
        assert_eq!(link::LinkConfig::try_from(&config.link).unwrap().staleness_threshold(), 20.0);
    }

    #[test]
    fn test_zero_cadence_is_an_error() {
        let path = std::env::temp_dir().join(format!("edge-zero-cadence-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[mqtt]\nhost = \"localhost\"\nport = 1883\nclient_prefix = \"edge\"\n\n[link]\ncadence_seconds = 0\n",
        )
        .unwrap();

        let result = Config::load(path.to_str().unwrap());
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(config::ConfigError::Message(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load("does-not-exist").is_err());
    }
}
