//! Capability demonstrations tailored to a business

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adaptability::DEFAULT_INDUSTRY;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::text::{capitalize, display_name, underlined};
use crate::knowledge::Dataset;
use crate::types::{normalize_id, BusinessSize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub demo_script: String,
    #[serde(default)]
    pub business_value: String,
}

impl Capability {
    fn mentions_any(&self, interests: &[String]) -> bool {
        let name = self.name.to_lowercase();
        let description = self.description.to_lowercase();
        interests
            .iter()
            .any(|interest| {
                name.contains(interest.as_str()) || description.contains(interest.as_str())
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryCapabilities {
    pub industry: String,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeCapabilities {
    pub size: BusinessSize,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityData {
    pub core: Vec<Capability>,
    #[serde(default)]
    pub industries: Vec<IndustryCapabilities>,
    #[serde(default)]
    pub business_sizes: Vec<SizeCapabilities>,
}

impl CapabilityData {
    pub fn industry(&self, id: &str) -> Option<&[Capability]> {
        self.industries
            .iter()
            .find(|c| c.industry == id)
            .map(|c| c.capabilities.as_slice())
    }

    pub fn size(&self, size: BusinessSize) -> Option<&[Capability]> {
        self.business_sizes
            .iter()
            .find(|c| c.size == size)
            .map(|c| c.capabilities.as_slice())
    }
}

impl Dataset for CapabilityData {
    const NAME: &'static str = "capabilities";
    const EMBEDDED: &'static str = include_str!("../../data/capabilities.json");

    fn validate(&self) -> Result<()> {
        if self.core.is_empty() {
            return Err(PitchwiseError::invalid_dataset(Self::NAME, "no core capabilities"));
        }
        self.industry(DEFAULT_INDUSTRY).ok_or_dataset(
            Self::NAME,
            format!("'{}' capabilities are required", DEFAULT_INDUSTRY),
        )?;
        self.size(BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "medium size capabilities are required")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevantCapabilities {
    pub core_capabilities: Vec<Capability>,
    pub industry_capabilities: Vec<Capability>,
    pub size_capabilities: Vec<Capability>,
}

impl RelevantCapabilities {
    pub fn is_empty(&self) -> bool {
        self.core_capabilities.is_empty()
            && self.industry_capabilities.is_empty()
            && self.size_capabilities.is_empty()
    }

    /// Core, then industry, then size
    pub fn all(&self) -> impl Iterator<Item = &Capability> {
        self.core_capabilities
            .iter()
            .chain(&self.industry_capabilities)
            .chain(&self.size_capabilities)
    }

    fn filtered(&self, interests: &[String]) -> Self {
        let keep = |caps: &[Capability]| -> Vec<Capability> {
            caps.iter().filter(|c| c.mentions_any(interests)).cloned().collect()
        };
        Self {
            core_capabilities: keep(&self.core_capabilities),
            industry_capabilities: keep(&self.industry_capabilities),
            size_capabilities: keep(&self.size_capabilities),
        }
    }
}

pub struct CapabilityShowcase {
    data: CapabilityData,
}

impl CapabilityShowcase {
    pub fn new(data: CapabilityData) -> Result<Self> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &CapabilityData {
        &self.data
    }

    /// Interests narrow the set unless nothing matches them
    pub fn relevant(
        &self,
        industry: &str,
        size: BusinessSize,
        interests: &[String],
    ) -> RelevantCapabilities {
        let industry_caps = self
            .data
            .industry(&normalize_id(industry))
            .or_else(|| self.data.industry(DEFAULT_INDUSTRY))
            .unwrap_or_default();
        let size_caps = self
            .data
            .size(size.tier())
            .or_else(|| self.data.size(BusinessSize::Medium))
            .unwrap_or_default();

        let relevant = RelevantCapabilities {
            core_capabilities: self.data.core.clone(),
            industry_capabilities: industry_caps.to_vec(),
            size_capabilities: size_caps.to_vec(),
        };

        let interests: Vec<String> = interests
            .iter()
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();
        if interests.is_empty() {
            return relevant;
        }

        let filtered = relevant.filtered(&interests);
        if filtered.is_empty() {
            log::debug!("no capability matches interests {:?}, keeping all", interests);
            relevant
        } else {
            filtered
        }
    }

    pub fn demonstration<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        industry: &str,
        size: BusinessSize,
        interests: &[String],
        max: usize,
    ) -> String {
        let relevant = self.relevant(industry, size, interests);
        let mut selected: Vec<&Capability> = relevant.all().collect();
        selected.shuffle(rng);
        selected.truncate(max);

        let mut out = underlined(&format!(
            "Capability Demonstration for {} ({} Business)",
            display_name(&normalize_id(industry)),
            capitalize(size.tier().as_str())
        ));
        out.push_str("\n\n");

        for (i, capability) in selected.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, capability.name));
            out.push_str(&format!("   {}\n\n", capability.description));
            out.push_str(&format!("   Demo:\n   {}\n\n", capability.demo_script));
            out.push_str(&format!("   Business Value:\n   {}\n\n", capability.business_value));
        }
        out
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        self.data = self.data.merged(patch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn showcase() -> CapabilityShowcase {
        CapabilityShowcase::new(CapabilityData::embedded().unwrap()).unwrap()
    }

    fn names(caps: &RelevantCapabilities) -> Vec<&str> {
        caps.all().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_unfiltered_set() {
        let relevant = showcase().relevant("retail", BusinessSize::Medium, &[]);
        assert_eq!(relevant.core_capabilities.len(), 5);
        assert_eq!(relevant.industry_capabilities[0].name, "Inventory Optimization");
        assert_eq!(relevant.size_capabilities[0].name, "Scalable Workflows");
        assert_eq!(relevant.all().count(), 9);
    }

    #[test]
    fn test_interests_filter() {
        let showcase = showcase();
        let interests = vec!["Inventory".to_string(), "customer".to_string()];
        let relevant = showcase.relevant("retail", BusinessSize::Medium, &interests);
        assert_eq!(names(&relevant), vec!["Inventory Optimization", "Customer Segmentation"]);
    }

    #[test]
    fn test_unmatched_interests_keep_everything() {
        let showcase = showcase();
        let relevant = showcase.relevant("retail", BusinessSize::Medium, &["quantum".to_string()]);
        assert_eq!(relevant, showcase.relevant("retail", BusinessSize::Medium, &[]));
    }

    #[test]
    fn test_fallbacks() {
        let relevant = showcase().relevant("forestry", BusinessSize::Micro, &[]);
        assert_eq!(relevant.industry_capabilities[0].name, "Code Analysis");
        assert_eq!(relevant.size_capabilities[0].name, "Cost-Effective Automation");
    }

    #[test]
    fn test_demonstration_is_bounded() {
        let showcase = showcase();
        let mut rng = StdRng::seed_from_u64(42);
        let demo = showcase.demonstration(&mut rng, "retail", BusinessSize::Medium, &[], 3);

        let title = "Capability Demonstration for Retail (Medium Business)";
        assert!(demo.starts_with(&format!("{}\n{}\n\n1. ", title, "=".repeat(title.len()))));
        assert!(demo.contains("\n3. "));
        assert!(!demo.contains("\n4. "));
        assert_eq!(demo.matches("   Demo:\n").count(), 3);
    }

    #[test]
    fn test_demonstration_title_uses_size_tier() {
        let mut rng = StdRng::seed_from_u64(1);
        let demo = showcase().demonstration(&mut rng, "retail", BusinessSize::Micro, &[], 2);
        assert!(demo.starts_with("Capability Demonstration for Retail (Small Business)\n"));
    }

    #[test]
    fn test_demonstration_is_reproducible() {
        let showcase = showcase();
        let a = showcase.demonstration(&mut StdRng::seed_from_u64(9), "finance", BusinessSize::Enterprise, &[], 4);
        let b = showcase.demonstration(&mut StdRng::seed_from_u64(9), "finance", BusinessSize::Enterprise, &[], 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_update_adds_industry() {
        let mut showcase = showcase();
        showcase
            .update(&json!({"industries": [{"industry": "agriculture", "capabilities": [
                {"name": "Yield Forecasting", "description": "Predicts crop yields"}
            ]}]}))
            .unwrap();
        let relevant = showcase.relevant("agriculture", BusinessSize::Small, &[]);
        assert_eq!(relevant.industry_capabilities[0].name, "Yield Forecasting");
    }
}
