//! Shared domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PitchwiseError;

/// Size category of a business
///
/// Threshold tables band businesses into all five categories, while the
/// profile and marketing tables only describe three tiers. [`BusinessSize::tier`]
/// folds the outer categories into their neighbours for those lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessSize {
    Micro,
    Small,
    #[default]
    Medium,
    Large,
    Enterprise,
}

impl BusinessSize {
    pub const ALL: [BusinessSize; 5] = [
        BusinessSize::Micro,
        BusinessSize::Small,
        BusinessSize::Medium,
        BusinessSize::Large,
        BusinessSize::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessSize::Micro => "micro",
            BusinessSize::Small => "small",
            BusinessSize::Medium => "medium",
            BusinessSize::Large => "large",
            BusinessSize::Enterprise => "enterprise",
        }
    }

    /// The profile tier used for lookups: small, medium or enterprise
    pub fn tier(&self) -> BusinessSize {
        match self {
            BusinessSize::Micro | BusinessSize::Small => BusinessSize::Small,
            BusinessSize::Medium => BusinessSize::Medium,
            BusinessSize::Large | BusinessSize::Enterprise => BusinessSize::Enterprise,
        }
    }
}

impl fmt::Display for BusinessSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessSize {
    type Err = PitchwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "micro" => Ok(BusinessSize::Micro),
            "small" => Ok(BusinessSize::Small),
            "medium" => Ok(BusinessSize::Medium),
            "large" => Ok(BusinessSize::Large),
            "enterprise" => Ok(BusinessSize::Enterprise),
            other => Err(PitchwiseError::invalid_input(format!(
                "unknown business size '{}' (expected micro, small, medium, large or enterprise)",
                other
            ))),
        }
    }
}

/// Lowercase and trim a free-form identifier such as an industry or role id
pub fn normalize_id(value: &str) -> String {
    value.trim().to_lowercase().replace([' ', '-'], "_")
}

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = PitchwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(PitchwiseError::invalid_input(format!(
                "unknown output format '{}' (expected text, json or yaml)",
                other
            ))),
        }
    }
}
