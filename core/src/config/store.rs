//! Configuration Store
//!
//! Loading, saving and validating `pitchwise.yaml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::env::EnvConfig;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::logger;
use crate::marketing::trust::TrustArea;

/// Unified Pitchwise configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub marketing: MarketingConfig,
}

/// Outcome of [`Config::resolve`]
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Config,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
    /// Environment overrides that were rejected
    pub ignored: Vec<String>,
}

/// WebSocket service bind address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Engine identity reported in the service handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append log lines to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory with dataset overrides; embedded defaults are used otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Defaults for generated marketing material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingConfig {
    #[serde(default = "default_annual_revenue")]
    pub annual_revenue: f64,
    #[serde(default = "default_employees")]
    pub employees: u32,
    #[serde(default = "default_proposition_count")]
    pub proposition_count: usize,
    #[serde(default = "default_max_capabilities")]
    pub max_capabilities: usize,
    #[serde(default = "default_trust_focus")]
    pub trust_focus: Vec<TrustArea>,
    /// Fixed seed for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MarketingConfig {
    fn default() -> Self {
        Self {
            annual_revenue: default_annual_revenue(),
            employees: default_employees(),
            proposition_count: default_proposition_count(),
            max_capabilities: default_max_capabilities(),
            trust_focus: default_trust_focus(),
            seed: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_name() -> String {
    "pitchwise-rules".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_annual_revenue() -> f64 {
    1_000_000.0
}

fn default_employees() -> u32 {
    50
}

fn default_proposition_count() -> usize {
    3
}

fn default_max_capabilities() -> usize {
    5
}

fn default_trust_focus() -> Vec<TrustArea> {
    TrustArea::ALL.to_vec()
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PitchwiseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yml::from_str(&content).map_err(|e| PitchwiseError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            })?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yml::to_string(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the explicit path, or the standard locations, or defaults.
    /// Environment overrides are applied and the result is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Resolved> {
        Self::resolve_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::resolve`] with environment lookups from `lookup`
    pub fn resolve_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Resolved>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => super::find_config_file(),
        };

        let mut config = match &source {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let ignored = EnvConfig::apply_with(&mut config, lookup);
        config.validate()?;
        Ok(Resolved {
            config,
            source,
            ignored,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| PitchwiseError::InvalidConfig {
            message: message.to_string(),
        };

        if self.api.host.trim().is_empty() {
            return Err(invalid("api.host must not be empty"));
        }
        if self.api.port == 0 {
            return Err(invalid("api.port must be non-zero"));
        }
        if self.model.name.trim().is_empty() {
            return Err(invalid("model.name must not be empty"));
        }
        logger::parse_level(&self.logging.level)?;

        let marketing = &self.marketing;
        if !marketing.annual_revenue.is_finite() || marketing.annual_revenue < 0.0 {
            return Err(invalid("marketing.annual_revenue must be a non-negative number"));
        }
        if marketing.proposition_count == 0 {
            return Err(invalid("marketing.proposition_count must be at least 1"));
        }
        if marketing.max_capabilities == 0 {
            return Err(invalid("marketing.max_capabilities must be at least 1"));
        }
        if marketing.trust_focus.is_empty() {
            return Err(invalid("marketing.trust_focus must name at least one area"));
        }
        Ok(())
    }

    /// WebSocket bind address as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Data directory, required by commands that write datasets
    pub fn require_data_dir(&self) -> Result<&Path> {
        self.knowledge.data_dir.as_deref().ok_or_missing("knowledge.data_dir")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.marketing.employees, 50);
        assert_eq!(config.marketing.trust_focus.len(), 3);
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "api:\n  port: 8080\nlogging:\n  level: debug\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.marketing.proposition_count, 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pitchwise.yaml");

        let mut config = Config::default();
        config.api.port = 6100;
        config.marketing.seed = Some(7);
        config.marketing.trust_focus = vec![TrustArea::Privacy];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(PitchwiseError::FileNotFound { .. })));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pitchwise.yaml");
        std::fs::write(&path, "api: [unclosed").unwrap();
        let result = Config::load(&path);
        assert!(matches!(result, Err(PitchwiseError::InvalidConfig { .. })));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.api.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.marketing.annual_revenue = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.marketing.proposition_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.marketing.trust_focus.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "marketing:\n  employees: 12\n").unwrap();

        let resolved = Config::resolve_with(Some(&path), |_| None).unwrap();
        assert_eq!(resolved.config.marketing.employees, 12);
        assert_eq!(resolved.source.as_deref(), Some(path.as_path()));
        assert!(resolved.ignored.is_empty());

        let missing = dir.path().join("missing.yaml");
        assert!(Config::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_reports_ignored_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pitchwise.yaml");
        std::fs::write(&path, "api:\n  port: 6200\n").unwrap();

        let resolved = Config::resolve_with(Some(&path), |key| {
            (key == "PITCHWISE_API_PORT").then(|| "http".to_string())
        })
        .unwrap();
        assert_eq!(resolved.config.api.port, 6200);
        assert_eq!(
            resolved.ignored,
            vec!["ignoring PITCHWISE_API_PORT=http: not a port number".to_string()]
        );
    }

    #[test]
    fn test_require_data_dir() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_data_dir(),
            Err(PitchwiseError::MissingConfig { .. })
        ));
        config.knowledge.data_dir = Some(PathBuf::from("/srv/pitchwise"));
        assert_eq!(config.require_data_dir().unwrap(), Path::new("/srv/pitchwise"));
    }
}
