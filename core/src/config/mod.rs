//! Configuration management
//!
//! A single YAML file (`pitchwise.yaml`) with environment overrides applied
//! on top. All configuration types are exported from this module.

pub mod env;
pub mod store;

pub use env::EnvConfig;
pub use store::{
    ApiConfig, Config, KnowledgeConfig, LoggingConfig, MarketingConfig, ModelConfig, Resolved,
};

use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "pitchwise.yaml";

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(dir) = get_config_dir() {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    use dirs::config_dir;
    use home::home_dir;

    if let Some(dir) = config_dir() {
        return Some(dir.join("pitchwise"));
    }

    if let Some(home) = home_dir() {
        return Some(home.join(".config").join("pitchwise"));
    }

    None
}

/// Where `config init` writes when no path is given
pub fn default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
