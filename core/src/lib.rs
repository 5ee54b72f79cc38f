pub mod adaptability;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod logger;
pub mod marketing;
pub mod output;
pub mod protocol;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use engine::{Engine, RecommendRequest, Recommendation};
pub use error::{PitchwiseError, Result};
pub use knowledge::KnowledgeBase;
pub use types::{BusinessSize, OutputFormat};
