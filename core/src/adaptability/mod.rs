//! Business adaptability
//!
//! Works out who the engine is talking to (industry, business size and
//! role) and turns that into an adaptation strategy.

pub mod context;
pub mod industry;
pub mod role;
pub mod size;

pub use context::{AdaptationStrategy, BusinessContext, BusinessContextAdapter, ContextRequest};
pub use industry::{IndustryClassification, IndustryClassifier};
pub use role::{RoleKind, RoleRecognition, RoleRecognizer};
pub use size::{BusinessSizeAnalyzer, SizeAnalysis};

use crate::knowledge::text::round_to;

/// Industry used when nothing matches
pub const DEFAULT_INDUSTRY: &str = "technology";
/// Organizational role used when nothing matches
pub const DEFAULT_ROLE: &str = "manager";
/// Functional role used when nothing matches
pub const DEFAULT_FUNCTION: &str = "technology";

/// Index of the first highest score, if any score is positive
pub(crate) fn top_scored(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, score) in scores.iter().enumerate() {
        if *score <= 0.0 {
            continue;
        }
        match best {
            Some(current) if scores[current] >= *score => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Share of `score` in `total` as a percentage with two decimals
pub(crate) fn confidence(score: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_to(score / total * 100.0, 2)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_scored_first_wins_ties() {
        assert_eq!(top_scored(&[0.0, 2.0, 2.0, 1.0]), Some(1));
        assert_eq!(top_scored(&[0.0, 0.0]), None);
        assert_eq!(top_scored(&[]), None);
        assert_eq!(top_scored(&[1.5, 3.0]), Some(1));
    }

    #[test]
    fn test_confidence() {
        assert_eq!(confidence(6.0, 7.0), 85.71);
        assert_eq!(confidence(1.0, 0.0), 0.0);
    }
}
