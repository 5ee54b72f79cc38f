//! Industry classification from a free-form business description

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{confidence, top_scored, DEFAULT_INDUSTRY};
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::{Dataset, KeywordIndex, MatchText};

/// Industries with their keywords, in match priority order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryData {
    pub industries: Vec<Industry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Industry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sub_industries: Vec<SubIndustry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubIndustry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl IndustryData {
    pub fn industry(&self, id: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.id == id)
    }
}

impl Dataset for IndustryData {
    const NAME: &'static str = "industries";
    const EMBEDDED: &'static str = include_str!("../../data/industries.json");

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for industry in &self.industries {
            if !seen.insert(industry.id.as_str()) {
                return Err(PitchwiseError::invalid_dataset(
                    Self::NAME,
                    format!("duplicate industry '{}'", industry.id),
                ));
            }
        }
        self.industry(DEFAULT_INDUSTRY)
            .ok_or_dataset(Self::NAME, format!("the '{}' industry is required", DEFAULT_INDUSTRY))?;
        Ok(())
    }
}

/// An industry or sub-industry with its confidence percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryMatch {
    pub id: String,
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSubIndustry {
    pub id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIndustry {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub sub_industries: Vec<ScoredSubIndustry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryClassification {
    pub primary_industry: IndustryMatch,
    pub sub_industry: Option<IndustryMatch>,
    /// Every industry that matched at all, in data order
    pub all_matches: Vec<ScoredIndustry>,
}

struct CompiledIndustry {
    keywords: KeywordIndex,
    sub_industries: Vec<KeywordIndex>,
}

pub struct IndustryClassifier {
    data: IndustryData,
    compiled: Vec<CompiledIndustry>,
    fallback: usize,
}

impl IndustryClassifier {
    pub fn new(data: IndustryData) -> Result<Self> {
        data.validate()?;
        let compiled = data
            .industries
            .iter()
            .map(|industry| {
                Ok(CompiledIndustry {
                    keywords: KeywordIndex::new(&industry.keywords)?,
                    sub_industries: industry
                        .sub_industries
                        .iter()
                        .map(|sub| KeywordIndex::new(&sub.keywords))
                        .collect::<Result<_>>()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let fallback = data
            .industries
            .iter()
            .position(|i| i.id == DEFAULT_INDUSTRY)
            .ok_or_dataset(IndustryData::NAME, "fallback industry missing")?;

        Ok(Self {
            data,
            compiled,
            fallback,
        })
    }

    pub fn data(&self) -> &IndustryData {
        &self.data
    }

    /// Score every industry against the description plus extra keywords
    pub fn classify(
        &self,
        description: &str,
        additional_keywords: &[String],
    ) -> IndustryClassification {
        let extra = additional_keywords.iter().map(String::as_str);
        let text = MatchText::joined(std::iter::once(description).chain(extra));

        let mut industry_scores = Vec::with_capacity(self.compiled.len());
        let mut sub_scores = Vec::with_capacity(self.compiled.len());
        for compiled in &self.compiled {
            let subs: Vec<f64> = compiled
                .sub_industries
                .iter()
                .map(|index| index.total(&text) as f64)
                .collect();
            let own = compiled.keywords.total(&text) as f64;
            industry_scores.push(own + subs.iter().sum::<f64>() * 0.5);
            sub_scores.push(subs);
        }

        let total: f64 = industry_scores.iter().sum();
        let (top, top_confidence) = match top_scored(&industry_scores) {
            Some(index) => (index, confidence(industry_scores[index], total)),
            None => (self.fallback, 0.0),
        };

        let top_industry = &self.data.industries[top];
        let sub_industry = top_scored(&sub_scores[top]).map(|sub| {
            let sub_total: f64 = sub_scores[top].iter().sum();
            let info = &top_industry.sub_industries[sub];
            IndustryMatch {
                id: info.id.clone(),
                name: info.name.clone(),
                confidence: confidence(sub_scores[top][sub], sub_total),
            }
        });

        let all_matches = self
            .data
            .industries
            .iter()
            .zip(industry_scores.iter().zip(&sub_scores))
            .filter(|(_, (score, _))| **score > 0.0)
            .map(|(industry, (score, subs))| ScoredIndustry {
                id: industry.id.clone(),
                name: industry.name.clone(),
                score: *score,
                sub_industries: industry
                    .sub_industries
                    .iter()
                    .zip(subs)
                    .filter(|(_, s)| **s > 0.0)
                    .map(|(sub, s)| ScoredSubIndustry {
                        id: sub.id.clone(),
                        name: sub.name.clone(),
                        score: *s,
                    })
                    .collect(),
            })
            .collect();

        log::debug!(
            "classified industry as {} ({:.2}%)",
            top_industry.id,
            top_confidence
        );

        IndustryClassification {
            primary_industry: IndustryMatch {
                id: top_industry.id.clone(),
                name: top_industry.name.clone(),
                confidence: top_confidence,
            },
            sub_industry,
            all_matches,
        }
    }

    /// Industry details, falling back to technology for unknown ids
    pub fn industry_information(&self, id: &str) -> &Industry {
        self.data
            .industry(id)
            .unwrap_or(&self.data.industries[self.fallback])
    }

    /// Merge new industries or keywords and recompile
    pub fn update(&mut self, patch: &Value) -> Result<()> {
        *self = Self::new(self.data.merged(patch)?)?;
        Ok(())
    }
}
