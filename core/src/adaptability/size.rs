//! Business size analysis from headcount, revenue and industry metrics

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::confidence;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::Dataset;
use crate::types::{normalize_id, BusinessSize};

const EMPLOYEES: &str = "employees";
const REVENUE: &str = "revenue";
const PRIMARY_WEIGHT: f64 = 0.4;
const ADDITIONAL_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeData {
    pub general_thresholds: Vec<MetricThresholds>,
    #[serde(default)]
    pub industry_thresholds: Vec<IndustryThresholds>,
    pub size_profiles: Vec<SizeProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub metric: String,
    pub bands: Vec<SizeBand>,
}

/// Inclusive range; a missing bound is open
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeBand {
    pub size: BusinessSize,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl SizeBand {
    fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryThresholds {
    pub industry: String,
    pub metrics: Vec<MetricThresholds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeProfile {
    pub size: BusinessSize,
    pub description: String,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

impl SizeData {
    pub fn profile(&self, size: BusinessSize) -> Option<&SizeProfile> {
        self.size_profiles.iter().find(|p| p.size == size)
    }

    fn thresholds_for(&self, industry: &str) -> &[MetricThresholds] {
        self.industry_thresholds
            .iter()
            .find(|t| t.industry == industry)
            .map(|t| t.metrics.as_slice())
            .unwrap_or(&self.general_thresholds)
    }
}

impl Dataset for SizeData {
    const NAME: &'static str = "business_sizes";
    const EMBEDDED: &'static str = include_str!("../../data/business_sizes.json");

    fn validate(&self) -> Result<()> {
        if self.general_thresholds.is_empty() {
            return Err(PitchwiseError::invalid_dataset(
                Self::NAME,
                "general thresholds are empty",
            ));
        }
        self.profile(BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "the medium size profile is required")?;
        Ok(())
    }
}

/// Measurements known about a business
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeMetrics {
    #[serde(default)]
    pub employees: Option<u64>,
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    /// Industry metrics such as `locations` or `beds`
    #[serde(default)]
    pub additional: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAssessment {
    pub metric: String,
    pub value: f64,
    pub category: BusinessSize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeAnalysis {
    pub size_category: BusinessSize,
    pub confidence: f64,
    pub description: String,
    pub challenges: Vec<String>,
    pub opportunities: Vec<String>,
    pub metrics_analysis: Vec<MetricAssessment>,
}

pub struct BusinessSizeAnalyzer {
    data: SizeData,
}

impl BusinessSizeAnalyzer {
    pub fn new(data: SizeData) -> Result<Self> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &SizeData {
        &self.data
    }

    pub fn analyze(&self, industry: &str, metrics: &SizeMetrics) -> SizeAnalysis {
        let thresholds = self.data.thresholds_for(&normalize_id(industry));
        let mut assessments = Vec::new();
        let mut assess = |name: &str, value: f64, weight: f64| {
            if let Some(table) = thresholds.iter().find(|t| t.metric == name) {
                assessments.push(MetricAssessment {
                    metric: name.to_string(),
                    value,
                    category: categorize(value, table),
                    weight,
                });
            }
        };

        if let Some(employees) = metrics.employees {
            assess(EMPLOYEES, employees as f64, PRIMARY_WEIGHT);
        }
        if let Some(revenue) = metrics.annual_revenue {
            assess(REVENUE, revenue, PRIMARY_WEIGHT);
        }
        for (name, value) in &metrics.additional {
            if name != EMPLOYEES && name != REVENUE {
                assess(name, *value, ADDITIONAL_WEIGHT);
            }
        }

        let (size_category, size_confidence) = match most_common(&assessments) {
            Some(size) => {
                let total: f64 = assessments.iter().map(|a| a.weight).sum();
                let agreeing: f64 = assessments
                    .iter()
                    .filter(|a| a.category == size)
                    .map(|a| a.weight)
                    .sum();
                (size, confidence(agreeing, total))
            }
            None => (BusinessSize::Medium, 0.0),
        };

        let profile = self.size_information(size_category);
        log::debug!(
            "business size {} ({:.2}%) from {} metrics",
            size_category,
            size_confidence,
            assessments.len()
        );

        SizeAnalysis {
            size_category,
            confidence: size_confidence,
            description: profile.description.clone(),
            challenges: profile.challenges.clone(),
            opportunities: profile.opportunities.clone(),
            metrics_analysis: assessments,
        }
    }

    /// Profile for the size's tier, falling back to medium
    pub fn size_information(&self, size: BusinessSize) -> &SizeProfile {
        self.data
            .profile(size.tier())
            .or_else(|| self.data.profile(BusinessSize::Medium))
            .unwrap_or(&self.data.size_profiles[0])
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        self.data = self.data.merged(patch)?;
        Ok(())
    }
}

/// First band containing the value; medium when none does
fn categorize(value: f64, thresholds: &MetricThresholds) -> BusinessSize {
    thresholds
        .bands
        .iter()
        .find(|band| band.contains(value))
        .map(|band| band.size)
        .unwrap_or(BusinessSize::Medium)
}

/// Most frequent category; ties go to the one seen first
fn most_common(assessments: &[MetricAssessment]) -> Option<BusinessSize> {
    let mut counts: Vec<(BusinessSize, usize)> = Vec::new();
    for assessment in assessments {
        match counts.iter_mut().find(|(size, _)| *size == assessment.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((assessment.category, 1)),
        }
    }

    let mut best: Option<(BusinessSize, usize)> = None;
    for (size, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((size, count));
        }
    }
    best.map(|(size, _)| size)
}
