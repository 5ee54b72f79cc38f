//! Competitive differentiation against people and other AI products

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::adaptability::DEFAULT_INDUSTRY;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::text::{capitalize, display_name, underlined};
use crate::knowledge::Dataset;
use crate::types::{normalize_id, BusinessSize};

const GENERAL_PICKS: usize = 3;
const CONTEXT_PICKS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Differentiator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub comparison: String,
    #[serde(default)]
    pub business_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryDifferentiators {
    pub industry: String,
    pub differentiators: Vec<Differentiator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeDifferentiators {
    pub size: BusinessSize,
    pub differentiators: Vec<Differentiator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferentiatorData {
    pub vs_human_workers: Vec<Differentiator>,
    pub vs_other_ai_solutions: Vec<Differentiator>,
    #[serde(default)]
    pub industries: Vec<IndustryDifferentiators>,
    #[serde(default)]
    pub business_sizes: Vec<SizeDifferentiators>,
}

impl DifferentiatorData {
    fn industry(&self, id: &str) -> Option<&[Differentiator]> {
        self.industries
            .iter()
            .find(|d| d.industry == id)
            .map(|d| d.differentiators.as_slice())
    }

    fn size(&self, size: BusinessSize) -> Option<&[Differentiator]> {
        self.business_sizes
            .iter()
            .find(|d| d.size == size)
            .map(|d| d.differentiators.as_slice())
    }
}

impl Dataset for DifferentiatorData {
    const NAME: &'static str = "differentiators";
    const EMBEDDED: &'static str = include_str!("../../data/differentiators.json");

    fn validate(&self) -> Result<()> {
        self.industry(DEFAULT_INDUSTRY).ok_or_dataset(
            Self::NAME,
            format!("'{}' differentiators are required", DEFAULT_INDUSTRY),
        )?;
        self.size(BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "medium size differentiators are required")?;
        Ok(())
    }
}

/// What the comparison is made against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competitor {
    Human,
    Ai,
    #[default]
    All,
}

impl Competitor {
    fn includes_human(&self) -> bool {
        matches!(self, Competitor::Human | Competitor::All)
    }

    fn includes_ai(&self) -> bool {
        matches!(self, Competitor::Ai | Competitor::All)
    }
}

impl fmt::Display for Competitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Competitor::Human => "human",
            Competitor::Ai => "ai",
            Competitor::All => "all",
        })
    }
}

impl FromStr for Competitor {
    type Err = PitchwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(Competitor::Human),
            "ai" => Ok(Competitor::Ai),
            "all" => Ok(Competitor::All),
            other => Err(PitchwiseError::invalid_input(format!(
                "unknown comparison '{}' (expected human, ai or all)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevantDifferentiators {
    /// Absent when the comparison excludes people
    pub vs_human_workers: Option<Vec<Differentiator>>,
    pub vs_other_ai_solutions: Option<Vec<Differentiator>>,
    pub industry_specific: Vec<Differentiator>,
    pub business_size: Vec<Differentiator>,
}

pub struct CompetitiveDifferentiator {
    data: DifferentiatorData,
}

impl CompetitiveDifferentiator {
    pub fn new(data: DifferentiatorData) -> Result<Self> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &DifferentiatorData {
        &self.data
    }

    pub fn relevant<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        industry: &str,
        size: BusinessSize,
        against: Competitor,
    ) -> RelevantDifferentiators {
        let industry_items = self
            .data
            .industry(&normalize_id(industry))
            .or_else(|| self.data.industry(DEFAULT_INDUSTRY))
            .unwrap_or_default();
        let size_items = self
            .data
            .size(size.tier())
            .or_else(|| self.data.size(BusinessSize::Medium))
            .unwrap_or_default();

        RelevantDifferentiators {
            vs_human_workers: against
                .includes_human()
                .then(|| sample(rng, &self.data.vs_human_workers, GENERAL_PICKS)),
            vs_other_ai_solutions: against
                .includes_ai()
                .then(|| sample(rng, &self.data.vs_other_ai_solutions, GENERAL_PICKS)),
            industry_specific: sample(rng, industry_items, CONTEXT_PICKS),
            business_size: sample(rng, size_items, CONTEXT_PICKS),
        }
    }

    pub fn comparison<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        industry: &str,
        size: BusinessSize,
        against: Competitor,
    ) -> String {
        let relevant = self.relevant(rng, industry, size, against);
        let industry_label = display_name(&normalize_id(industry));
        let size_label = capitalize(size.tier().as_str());

        let mut out = underlined(&format!(
            "Competitive Advantages for {} ({} Business)",
            industry_label, size_label
        ));
        out.push_str("\n\n");

        let sections = [
            (
                "Advantages Over Human-Performed Tasks".to_string(),
                relevant.vs_human_workers.as_deref(),
            ),
            (
                "Advantages Over Other AI Solutions".to_string(),
                relevant.vs_other_ai_solutions.as_deref(),
            ),
            (
                format!("{} Industry-Specific Advantages", industry_label),
                Some(relevant.industry_specific.as_slice()),
            ),
            (
                format!("{} Business Size Advantages", size_label),
                Some(relevant.business_size.as_slice()),
            ),
        ];
        for (heading, items) in sections {
            let Some(items) = items else { continue };
            out.push_str(&format!("## {}\n\n", heading));
            for item in items {
                out.push_str(&format!(
                    "### {}\n{}\n\n**Comparison:** {}\n\n**Business Impact:** {}\n\n",
                    item.title, item.description, item.comparison, item.business_impact
                ));
            }
        }
        out
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        self.data = self.data.merged(patch)?;
        Ok(())
    }
}

/// Up to `n` items in random order
fn sample<R: Rng + ?Sized>(rng: &mut R, items: &[Differentiator], n: usize) -> Vec<Differentiator> {
    items.choose_multiple(rng, n).cloned().collect()
}
