//! Environment variable overrides
//!
//! Applied after the YAML file. Unparseable values are ignored and reported
//! back so the caller can warn once logging is up.

use std::path::PathBuf;

use super::Config;

pub const ENV_API_HOST: &str = "PITCHWISE_API_HOST";
pub const ENV_API_PORT: &str = "PITCHWISE_API_PORT";
pub const ENV_MODEL: &str = "PITCHWISE_MODEL";
pub const ENV_LOG_LEVEL: &str = "PITCHWISE_LOG_LEVEL";
pub const ENV_DATA_DIR: &str = "PITCHWISE_DATA_DIR";
pub const ENV_SEED: &str = "PITCHWISE_SEED";

pub struct EnvConfig;

impl EnvConfig {
    /// Apply overrides from an arbitrary lookup, returning the ignored ones
    pub fn apply_with<F>(config: &mut Config, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ignored = Vec::new();

        if let Some(host) = lookup(ENV_API_HOST) {
            config.api.host = host;
        }
        if let Some(val) = lookup(ENV_API_PORT) {
            match val.trim().parse() {
                Ok(port) => config.api.port = port,
                Err(_) => ignored.push(format!(
                    "ignoring {}={}: not a port number",
                    ENV_API_PORT, val
                )),
            }
        }

        if let Some(model) = lookup(ENV_MODEL) {
            config.model.name = model;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = level.trim().to_lowercase();
        }

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config.knowledge.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(val) = lookup(ENV_SEED) {
            match val.trim().parse() {
                Ok(seed) => config.marketing.seed = Some(seed),
                Err(_) => ignored.push(format!("ignoring {}={}: not an integer", ENV_SEED, val)),
            }
        }
        ignored
    }
}
