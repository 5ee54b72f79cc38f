//! CLI argument parsing using clap 4.x derive macros

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use pitchwise_core::adaptability::ContextRequest;
use pitchwise_core::marketing::{Competitor, MarketingRequest, TrustArea};
use pitchwise_core::{BusinessSize, OutputFormat};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Business-aware self-marketing engine
///
/// Reads a prospect's business description and job title, works out the
/// industry, size and role, and produces adapted sales material.
#[derive(Parser, Debug)]
#[command(name = "pitchwise")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./pitchwise.yaml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory with dataset overrides
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Seed for reproducible generated text
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Output format (text, json, yaml)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Echo debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify industry, size and role of a prospect
    Analyze {
        #[command(flatten)]
        prospect: ProspectArgs,
    },

    /// Show how content, features and engagement adapt to a prospect
    Strategy {
        #[command(flatten)]
        prospect: ProspectArgs,
    },

    /// Analyze a prospect and produce the matching marketing package
    Recommend {
        #[command(flatten)]
        prospect: ProspectArgs,

        /// Capability interest (repeatable; defaults to the keywords)
        #[arg(short, long = "interest")]
        interests: Vec<String>,

        /// Also render a proposal for this company
        #[arg(long)]
        company: Option<String>,
    },

    /// One-paragraph elevator pitch
    Pitch {
        #[command(flatten)]
        facets: FacetArgs,
    },

    /// Full proposal document for a company
    Proposal {
        #[command(flatten)]
        target: PackageArgs,

        /// Company the proposal is addressed to
        #[arg(long)]
        company: String,

        /// Write the proposal here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Propositions, ROI, capabilities, comparison and trust in one package
    Package {
        #[command(flatten)]
        target: PackageArgs,
    },

    /// Estimate return on investment
    Roi {
        #[arg(long, default_value = "technology")]
        industry: String,

        #[arg(long, default_value = "medium")]
        size: BusinessSize,

        /// Annual revenue
        #[arg(long)]
        revenue: f64,

        /// Employee count (defaults to the configured value)
        #[arg(long)]
        employees: Option<u64>,

        /// Known yearly labor costs
        #[arg(long)]
        labor_costs: Option<f64>,

        /// Known yearly non-labor operating costs
        #[arg(long)]
        other_costs: Option<f64>,
    },

    /// Demonstrate capabilities relevant to a business
    Capabilities {
        #[arg(long, default_value = "technology")]
        industry: String,

        #[arg(long, default_value = "medium")]
        size: BusinessSize,

        #[arg(short, long = "interest")]
        interests: Vec<String>,

        /// Maximum capabilities shown (defaults to the configured value)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Competitive comparison
    Compare {
        #[arg(long, default_value = "technology")]
        industry: String,

        #[arg(long, default_value = "medium")]
        size: BusinessSize,

        /// Compare against human, ai or all
        #[arg(long, default_value = "all")]
        against: Competitor,
    },

    /// Trust and security statement
    Trust {
        #[arg(long, default_value = "technology")]
        industry: String,

        /// Area to cover: security, privacy, ethics (repeatable; default all)
        #[arg(long = "area")]
        areas: Vec<TrustArea>,
    },

    /// Generate value propositions
    Propositions {
        #[command(flatten)]
        facets: FacetArgs,

        /// Number of propositions (defaults to the configured value)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Extra template variable; a single proposition is rendered
        #[arg(long = "var", value_parser = parse_key_value::<String>)]
        vars: Vec<(String, String)>,
    },

    /// Start the WebSocket server
    Serve {
        /// Address to bind (overrides api.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides api.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check that this host can run the service
    Doctor,

    /// Inspect and maintain datasets
    Data {
        #[command(subcommand)]
        cmd: DataCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommand {
    /// Write every dataset as JSON into a directory
    Export {
        /// Target directory (defaults to knowledge.data_dir)
        dir: Option<PathBuf>,
    },
    /// Print one dataset
    Show {
        /// Dataset name, e.g. industries or roi_metrics
        name: String,
    },
    /// Merge a JSON patch into a dataset and save it to the data directory
    Update {
        name: String,

        /// File holding the JSON patch
        #[arg(long, conflicts_with = "json")]
        patch: Option<PathBuf>,

        /// Inline JSON patch
        #[arg(long)]
        json: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Destination (defaults to the user config dir)
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print which configuration file is in use
    Path,
}

/// What is known about a prospect
#[derive(Args, Debug, Clone)]
pub struct ProspectArgs {
    /// Free-text business description
    pub description: String,

    /// Job title of the person addressed
    #[arg(short = 't', long)]
    pub title: String,

    #[arg(long)]
    pub employees: Option<u64>,

    /// Annual revenue
    #[arg(long)]
    pub revenue: Option<f64>,

    /// Extra keyword for industry matching (repeatable)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Additional text about the role
    #[arg(long)]
    pub role_info: Option<String>,

    /// Industry metric such as locations=12 (repeatable)
    #[arg(long = "metric", value_parser = parse_key_value::<f64>)]
    pub metrics: Vec<(String, f64)>,
}

impl ProspectArgs {
    pub fn to_request(&self) -> ContextRequest {
        ContextRequest {
            business_description: self.description.clone(),
            job_title: self.title.clone(),
            employees: self.employees,
            annual_revenue: self.revenue,
            keywords: self.keywords.clone(),
            role_info: self.role_info.clone(),
            industry_metrics: self.metrics.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Industry, size and role picked directly
#[derive(Args, Debug, Clone)]
pub struct FacetArgs {
    #[arg(long, default_value = "technology")]
    pub industry: String,

    #[arg(long, default_value = "medium")]
    pub size: BusinessSize,

    #[arg(long, default_value = "manager")]
    pub role: String,
}

#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    #[command(flatten)]
    pub facets: FacetArgs,

    /// Annual revenue (defaults to the configured value)
    #[arg(long)]
    pub revenue: Option<f64>,

    /// Employee count (defaults to the configured value)
    #[arg(long)]
    pub employees: Option<u64>,

    #[arg(short, long = "interest")]
    pub interests: Vec<String>,
}

impl PackageArgs {
    pub fn to_request(&self) -> MarketingRequest {
        MarketingRequest {
            industry: self.facets.industry.clone(),
            business_size: self.facets.size,
            role: self.facets.role.clone(),
            annual_revenue: self.revenue,
            employees: self.employees,
            interests: self.interests.clone(),
        }
    }
}

/// Parse `key=value`
fn parse_key_value<T>(s: &str) -> Result<(String, T), String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    Ok((key.to_string(), value))
}
