use crate::error::{CleanerError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub data: DataConfig,
}

/// Default input and output locations for the survey dataset.
#[derive(Debug, Deserialize)]
pub struct DataConfig {
    pub input_path: String,
    pub output_path: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
