//! Trust and security statements

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::adaptability::DEFAULT_INDUSTRY;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::text::{display_name, underlined};
use crate::knowledge::Dataset;
use crate::types::normalize_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustMeasure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub business_relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryMeasures {
    pub industry: String,
    pub measures: Vec<TrustMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub verification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustData {
    pub security: Vec<TrustMeasure>,
    pub privacy: Vec<TrustMeasure>,
    pub ethics: Vec<TrustMeasure>,
    #[serde(default)]
    pub industries: Vec<IndustryMeasures>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub commitments: Vec<String>,
}

impl TrustData {
    fn area(&self, area: TrustArea) -> &[TrustMeasure] {
        match area {
            TrustArea::Security => &self.security,
            TrustArea::Privacy => &self.privacy,
            TrustArea::Ethics => &self.ethics,
        }
    }

    fn industry(&self, industry: &str) -> Option<&IndustryMeasures> {
        self.industries.iter().find(|m| m.industry == industry)
    }
}

impl Dataset for TrustData {
    const NAME: &'static str = "trust";
    const EMBEDDED: &'static str = include_str!("../../data/trust.json");

    fn validate(&self) -> Result<()> {
        self.industry(DEFAULT_INDUSTRY)
            .ok_or_dataset(Self::NAME, format!("'{}' measures are required", DEFAULT_INDUSTRY))?;
        Ok(())
    }
}

/// Trust topic a statement can cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustArea {
    Security,
    Privacy,
    Ethics,
}

impl TrustArea {
    pub const ALL: [TrustArea; 3] = [TrustArea::Security, TrustArea::Privacy, TrustArea::Ethics];

    pub fn heading(&self) -> &'static str {
        match self {
            TrustArea::Security => "Security Measures",
            TrustArea::Privacy => "Privacy Protections",
            TrustArea::Ethics => "Ethical AI Practices",
        }
    }
}

impl fmt::Display for TrustArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrustArea::Security => "security",
            TrustArea::Privacy => "privacy",
            TrustArea::Ethics => "ethics",
        })
    }
}

impl FromStr for TrustArea {
    type Err = PitchwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "security" => Ok(TrustArea::Security),
            "privacy" => Ok(TrustArea::Privacy),
            "ethics" => Ok(TrustArea::Ethics),
            other => Err(PitchwiseError::invalid_input(format!(
                "unknown trust area '{}' (expected security, privacy or ethics)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMeasures {
    pub area: TrustArea,
    pub measures: Vec<TrustMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustInformation {
    pub commitments: Vec<String>,
    /// Requested areas in statement order
    pub areas: Vec<AreaMeasures>,
    pub industry_specific: Vec<TrustMeasure>,
    pub certifications: Vec<Certification>,
}

pub struct TrustBuilder {
    data: TrustData,
}

impl TrustBuilder {
    pub fn new(data: TrustData) -> Result<Self> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &TrustData {
        &self.data
    }

    /// An empty `areas` selects all three
    pub fn relevant(&self, industry: &str, areas: &[TrustArea]) -> TrustInformation {
        let selected: Vec<TrustArea> = TrustArea::ALL
            .into_iter()
            .filter(|area| areas.is_empty() || areas.contains(area))
            .collect();

        let industry_specific = self
            .data
            .industry(&normalize_id(industry))
            .or_else(|| self.data.industry(DEFAULT_INDUSTRY))
            .map(|m| m.measures.clone())
            .unwrap_or_default();

        TrustInformation {
            commitments: self.data.commitments.clone(),
            areas: selected
                .into_iter()
                .map(|area| AreaMeasures {
                    area,
                    measures: self.data.area(area).to_vec(),
                })
                .collect(),
            industry_specific,
            certifications: self.data.certifications.clone(),
        }
    }

    pub fn statement(&self, industry: &str, areas: &[TrustArea]) -> String {
        let info = self.relevant(industry, areas);
        let label = display_name(&normalize_id(industry));

        let mut out = underlined(&format!(
            "Trust and Security Statement for {} Organizations",
            label
        ));
        out.push_str("\n\n## Our Commitments to You\n\n");
        for commitment in &info.commitments {
            out.push_str(&format!("- {}\n", commitment));
        }
        out.push('\n');

        for section in &info.areas {
            out.push_str(&format!("## {}\n\n", section.area.heading()));
            for measure in &section.measures {
                push_measure(&mut out, measure);
            }
        }

        if !info.industry_specific.is_empty() {
            out.push_str(&format!("## {} Industry-Specific Protections\n\n", label));
            for measure in &info.industry_specific {
                push_measure(&mut out, measure);
            }
        }

        out.push_str("## Certifications and Compliance\n\n");
        for cert in &info.certifications {
            out.push_str(&format!(
                "### {}\n{}\n\n**Verification:** {}\n\n",
                cert.name, cert.description, cert.verification
            ));
        }
        out
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        self.data = self.data.merged(patch)?;
        Ok(())
    }
}

fn push_measure(out: &mut String, measure: &TrustMeasure) {
    out.push_str(&format!(
        "### {}\n{}\n\n**Details:** {}\n\n**Business Relevance:** {}\n\n",
        measure.title, measure.description, measure.details, measure.business_relevance
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TrustBuilder {
        TrustBuilder::new(TrustData::embedded().unwrap()).unwrap()
    }

    #[test]
    fn test_default_areas_cover_everything() {
        let info = builder().relevant("finance", &[]);
        let areas: Vec<_> = info.areas.iter().map(|a| a.area).collect();
        assert_eq!(areas, TrustArea::ALL.to_vec());
        assert_eq!(info.certifications.len(), 4);
        assert_eq!(info.commitments.len(), 8);
    }

    #[test]
    fn test_areas_keep_statement_order() {
        let info = builder().relevant("finance", &[TrustArea::Ethics, TrustArea::Security]);
        let areas: Vec<_> = info.areas.iter().map(|a| a.area).collect();
        assert_eq!(areas, vec![TrustArea::Security, TrustArea::Ethics]);
    }

    #[test]
    fn test_unknown_industry_falls_back() {
        let builder = builder();
        let fallback = builder.relevant("mining", &[]);
        let technology = builder.relevant("technology", &[]);
        assert_eq!(fallback.industry_specific, technology.industry_specific);
    }

    #[test]
    fn test_statement_layout() {
        let statement = builder().statement("healthcare", &[TrustArea::Privacy]);
        let title = "Trust and Security Statement for Healthcare Organizations";
        assert!(statement.starts_with(&format!("{}\n{}\n\n", title, "=".repeat(title.len()))));
        assert!(statement.contains("## Our Commitments to You"));
        assert!(statement.contains("## Privacy Protections"));
        assert!(!statement.contains("## Security Measures"));
        assert!(statement.contains("## Healthcare Industry-Specific Protections"));
        assert!(statement.contains("**Verification:**"));

        let privacy = statement.find("## Privacy Protections").unwrap();
        let certs = statement.find("## Certifications and Compliance").unwrap();
        assert!(privacy < certs);
    }

    #[test]
    fn test_parse_area() {
        assert_eq!("Privacy".parse::<TrustArea>().unwrap(), TrustArea::Privacy);
        assert!("safety".parse::<TrustArea>().is_err());
    }
}
