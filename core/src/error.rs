//! Structured error types for Pitchwise
//!
//! One error enum for the whole engine, with user-facing messages for the
//! CLI and the WebSocket service.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for Pitchwise operations
#[derive(Error, Debug)]
pub enum PitchwiseError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Missing required config
    #[error("missing required configuration: {key}")]
    MissingConfig { key: String },

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Invalid caller input (unknown size, negative revenue, ...)
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// File not found
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    // =========================================================================
    // Knowledge Base Errors
    // =========================================================================
    /// A dataset parsed but does not hold what the engine needs
    #[error("invalid dataset {dataset}: {reason}")]
    InvalidDataset { dataset: String, reason: String },

    /// Dataset name not recognised
    #[error("unknown dataset: {name}")]
    UnknownDataset { name: String },

    // =========================================================================
    // Rendering / Internal Errors
    // =========================================================================
    /// Template compilation or rendering failed
    #[error("template error: {0}")]
    Template(String),

    /// Internal system error
    #[error("internal error: {message}")]
    Internal { message: String },

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl PitchwiseError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_dataset(dataset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            dataset: dataset.into(),
            reason: reason.into(),
        }
    }

    /// Check if error requires user action
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidDataset { .. }
                | Self::UnknownDataset { .. }
                | Self::FileNotFound { .. }
        )
    }

    /// Short machine-readable code, used as the `code` of protocol errors
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } | Self::MissingConfig { .. } => "config_error",
            Self::InvalidInput { .. } => "invalid_input",
            Self::FileNotFound { .. } => "not_found",
            Self::InvalidDataset { .. } | Self::UnknownDataset { .. } => "dataset_error",
            Self::Template(_) => "template_error",
            Self::Internal { .. } => "internal_error",
            Self::Io(_) => "io_error",
            Self::Json(_) | Self::Yaml(_) => "serialization_error",
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidConfig { message } => {
                format!(
                    "Configuration problem: {}. Run `pitchwise config show` to inspect it.",
                    message
                )
            }
            Self::UnknownDataset { name } => format!(
                "No dataset named '{}'. Known datasets: {}.",
                name,
                crate::knowledge::DATASET_NAMES.join(", ")
            ),
            Self::InvalidDataset { dataset, reason } => {
                format!("The {} data is not usable ({}).", dataset, reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Convert from anyhow::Error to PitchwiseError
impl From<anyhow::Error> for PitchwiseError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Self::Io(std::io::Error::new(io_err.kind(), io_err.to_string()));
        }

        Self::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PitchwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yml::Error> for PitchwiseError {
    fn from(err: serde_yml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Tera keeps the useful part of the message in the source chain
impl From<tera::Error> for PitchwiseError {
    fn from(err: tera::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Template(message)
    }
}

/// Result type alias using PitchwiseError
pub type Result<T> = std::result::Result<T, PitchwiseError>;

/// Extension trait for converting Option to Result with PitchwiseError
pub trait OptionExt<T> {
    fn ok_or_not_found(self, path: impl Into<PathBuf>) -> Result<T>;
    fn ok_or_missing(self, key: impl Into<String>) -> Result<T>;
    fn ok_or_dataset(self, dataset: &str, reason: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, path: impl Into<PathBuf>) -> Result<T> {
        self.ok_or_else(|| PitchwiseError::FileNotFound { path: path.into() })
    }

    fn ok_or_missing(self, key: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| PitchwiseError::MissingConfig { key: key.into() })
    }

    fn ok_or_dataset(self, dataset: &str, reason: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| PitchwiseError::invalid_dataset(dataset, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_action_errors() {
        assert!(PitchwiseError::invalid_input("revenue must not be negative").requires_user_action());
        assert!(PitchwiseError::UnknownDataset {
            name: "weather".to_string()
        }
        .requires_user_action());
        assert!(!PitchwiseError::Template("boom".to_string()).requires_user_action());
    }

    #[test]
    fn test_user_messages() {
        let err = PitchwiseError::UnknownDataset {
            name: "weather".to_string(),
        };
        let message = err.user_message();
        assert!(message.contains("weather"));
        assert!(message.contains("industries"));

        let err = PitchwiseError::InvalidConfig {
            message: "port must be non-zero".to_string(),
        };
        assert!(err.user_message().contains("config show"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(PitchwiseError::invalid_input("x").code(), "invalid_input");
        assert_eq!(
            PitchwiseError::invalid_dataset("roles", "empty").code(),
            "dataset_error"
        );
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_not_found("/tmp/test");
        assert!(matches!(result, Err(PitchwiseError::FileNotFound { .. })));

        let opt: Option<i32> = None;
        let result = opt.ok_or_missing("api.port");
        assert!(matches!(result, Err(PitchwiseError::MissingConfig { .. })));

        let opt: Option<i32> = None;
        let result = opt.ok_or_dataset("industries", "technology entry missing");
        assert!(matches!(result, Err(PitchwiseError::InvalidDataset { .. })));
    }

    #[test]
    fn test_json_conversion() {
        let err: PitchwiseError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, PitchwiseError::Json(_)));
        assert_eq!(err.code(), "serialization_error");
    }
}
