//! Value propositions rendered from Tera templates

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tera::{Context, Tera};

use crate::adaptability::{DEFAULT_INDUSTRY, DEFAULT_ROLE};
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::Dataset;
use crate::types::{normalize_id, BusinessSize};

/// Give up on finding new distinct propositions after this many draws per proposition
const DRAWS_PER_PROPOSITION: usize = 25;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePool {
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryPool {
    pub id: String,
    #[serde(flatten)]
    pub pool: MessagePool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePool {
    pub size: BusinessSize,
    #[serde(flatten)]
    pub pool: MessagePool,
}

/// Pain points, benefits and metrics per facet, plus proposition templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropositionData {
    pub industries: Vec<IndustryPool>,
    pub business_sizes: Vec<SizePool>,
    #[serde(default)]
    pub roles: Vec<IndustryPool>,
    pub templates: Vec<String>,
}

impl PropositionData {
    fn industry(&self, id: &str) -> Option<&MessagePool> {
        self.industries.iter().find(|p| p.id == id).map(|p| &p.pool)
    }

    fn size(&self, size: BusinessSize) -> Option<&MessagePool> {
        self.business_sizes.iter().find(|p| p.size == size).map(|p| &p.pool)
    }

    fn role(&self, id: &str) -> Option<&MessagePool> {
        self.roles.iter().find(|p| p.id == id).map(|p| &p.pool)
    }
}

impl Dataset for PropositionData {
    const NAME: &'static str = "value_propositions";
    const EMBEDDED: &'static str = include_str!("../../data/value_propositions.json");

    fn validate(&self) -> Result<()> {
        self.industry(DEFAULT_INDUSTRY)
            .ok_or_dataset(Self::NAME, format!("a '{}' pool is required", DEFAULT_INDUSTRY))?;
        self.size(BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "a medium pool is required")?;
        if self.templates.is_empty() {
            return Err(PitchwiseError::invalid_dataset(Self::NAME, "no templates"));
        }
        compile(&self.templates)?;
        Ok(())
    }
}

fn compile(templates: &[String]) -> Result<Tera> {
    let mut tera = Tera::default();
    for (index, source) in templates.iter().enumerate() {
        tera.add_raw_template(&template_name(index), source)
            .map_err(|e| {
                PitchwiseError::invalid_dataset(
                    PropositionData::NAME,
                    PitchwiseError::from(e).to_string(),
                )
            })?;
    }
    Ok(tera)
}

fn template_name(index: usize) -> String {
    format!("proposition_{}", index)
}

pub struct ValuePropositionGenerator {
    data: PropositionData,
    tera: Tera,
}

impl ValuePropositionGenerator {
    pub fn new(data: PropositionData) -> Result<Self> {
        data.validate()?;
        let tera = compile(&data.templates)?;
        Ok(Self { data, tera })
    }

    pub fn data(&self) -> &PropositionData {
        &self.data
    }

    /// One proposition for the context; `custom` adds or overrides template variables
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        industry: &str,
        size: BusinessSize,
        role: &str,
        custom: &BTreeMap<String, String>,
    ) -> Result<String> {
        let industry_id = normalize_id(industry);
        let role_id = normalize_id(role);

        let empty = MessagePool::default();
        let pools = [
            self.data
                .industry(&industry_id)
                .or_else(|| self.data.industry(DEFAULT_INDUSTRY))
                .unwrap_or(&empty),
            self.data
                .size(size.tier())
                .or_else(|| self.data.size(BusinessSize::Medium))
                .unwrap_or(&empty),
            self.data
                .role(&role_id)
                .or_else(|| self.data.role(DEFAULT_ROLE))
                .unwrap_or(&empty),
        ];

        let pain_point = choose(rng, pools.iter().flat_map(|p| &p.pain_points));
        let benefit = choose(rng, pools.iter().flat_map(|p| &p.benefits));
        let metric = choose(rng, pools.iter().flat_map(|p| &p.metrics));
        let template = rng.gen_range(0..self.data.templates.len());

        let mut context = Context::new();
        context.insert("industry", &industry_id.replace('_', " "));
        context.insert("business_size", size.tier().as_str());
        context.insert("role", &role_id.replace('_', " "));
        context.insert("pain_point", &pain_point);
        context.insert("benefit", &benefit);
        context.insert("metric", &metric);
        context.insert("metric_improvement", &format!("improved {}", metric));
        for (key, value) in custom {
            context.insert(key.as_str(), value);
        }

        Ok(self.tera.render(&template_name(template), &context)?)
    }

    /// Up to `count` distinct propositions
    pub fn generate_many<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        industry: &str,
        size: BusinessSize,
        role: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        let custom = BTreeMap::new();
        let mut seen = HashSet::new();
        let mut propositions = Vec::with_capacity(count);

        for _ in 0..count.saturating_mul(DRAWS_PER_PROPOSITION) {
            if propositions.len() == count {
                break;
            }
            let proposition = self.generate(rng, industry, size, role, &custom)?;
            if seen.insert(proposition.clone()) {
                propositions.push(proposition);
            }
        }

        if propositions.len() < count {
            log::debug!(
                "only {} distinct propositions available out of {} requested",
                propositions.len(),
                count
            );
        }
        Ok(propositions)
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        *self = Self::new(self.data.merged(patch)?)?;
        Ok(())
    }
}

fn choose<'a, R, I>(rng: &mut R, items: I) -> String
where
    R: Rng + ?Sized,
    I: Iterator<Item = &'a String>,
{
    let items: Vec<&String> = items.collect();
    items.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn generator() -> ValuePropositionGenerator {
        ValuePropositionGenerator::new(PropositionData::embedded().unwrap()).unwrap()
    }

    #[test]
    fn test_generates_from_pools() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(7);
        let proposition = generator
            .generate(&mut rng, "retail", BusinessSize::Small, "executive", &BTreeMap::new())
            .unwrap();
        assert!(!proposition.is_empty());
        assert!(!proposition.contains("{{"));

        let data = generator.data();
        let pools = [
            &data.industry("retail").unwrap().pain_points,
            &data.size(BusinessSize::Small).unwrap().pain_points,
            &data.role("executive").unwrap().pain_points,
        ];
        assert!(pools.iter().flat_map(|p| p.iter()).any(|p| proposition.contains(p.as_str())));
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = generator();
        let a = generator
            .generate_many(&mut StdRng::seed_from_u64(11), "finance", BusinessSize::Enterprise, "manager", 3)
            .unwrap();
        let b = generator
            .generate_many(&mut StdRng::seed_from_u64(11), "finance", BusinessSize::Enterprise, "manager", 3)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_many_are_distinct() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(3);
        let propositions = generator
            .generate_many(&mut rng, "healthcare", BusinessSize::Medium, "specialist", 10)
            .unwrap();
        let unique: HashSet<_> = propositions.iter().collect();
        assert_eq!(unique.len(), propositions.len());
        assert_eq!(propositions.len(), 10);
    }

    #[test]
    fn test_unknown_facets_fall_back() {
        let generator = generator();
        let mut rng = StdRng::seed_from_u64(5);
        let proposition = generator
            .generate(&mut rng, "space mining", BusinessSize::Micro, "astronaut", &BTreeMap::new())
            .unwrap();
        assert!(!proposition.is_empty());
    }

    #[test]
    fn test_custom_variables_override() {
        let data: PropositionData = serde_json::from_value(json!({
            "industries": [{"id": "technology", "pain_points": ["slow releases"], "benefits": ["faster delivery"], "metrics": ["cycle time"]}],
            "business_sizes": [{"size": "medium", "pain_points": [], "benefits": [], "metrics": []}],
            "templates": ["{{ company | default(value='You') }}: {{ pain_point }} becomes {{ benefit }} ({{ metric_improvement }})."]
        }))
        .unwrap();
        let generator = ValuePropositionGenerator::new(data).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let plain = generator
            .generate(&mut rng, "technology", BusinessSize::Medium, "manager", &BTreeMap::new())
            .unwrap();
        assert_eq!(plain, "You: slow releases becomes faster delivery (improved cycle time).");

        let custom = BTreeMap::from([("company".to_string(), "Acme".to_string())]);
        let named = generator
            .generate(&mut rng, "technology", BusinessSize::Medium, "manager", &custom)
            .unwrap();
        assert!(named.starts_with("Acme:"));
    }

    #[test]
    fn test_only_distinct_propositions_returned() {
        let data: PropositionData = serde_json::from_value(json!({
            "industries": [{"id": "technology", "pain_points": ["a"], "benefits": ["b"], "metrics": ["c"]}],
            "business_sizes": [{"size": "medium"}],
            "templates": ["{{ pain_point }} {{ benefit }} {{ metric }}"]
        }))
        .unwrap();
        let generator = ValuePropositionGenerator::new(data).unwrap();
        let propositions = generator
            .generate_many(&mut StdRng::seed_from_u64(2), "technology", BusinessSize::Medium, "manager", 3)
            .unwrap();
        assert_eq!(propositions, vec!["a b c".to_string()]);
    }

    #[test]
    fn test_broken_template_is_rejected() {
        let data: PropositionData = serde_json::from_value(json!({
            "industries": [{"id": "technology"}],
            "business_sizes": [{"size": "medium"}],
            "templates": ["{{ unclosed"]
        }))
        .unwrap();
        assert!(matches!(
            ValuePropositionGenerator::new(data),
            Err(PitchwiseError::InvalidDataset { .. })
        ));
    }
}
