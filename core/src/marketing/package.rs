//! The self-marketing module: every generator behind one seeded random source

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tera::{Context, Tera};

use super::capabilities::{CapabilityData, CapabilityShowcase};
use super::differentiators::{CompetitiveDifferentiator, Competitor, DifferentiatorData};
use super::propositions::{PropositionData, ValuePropositionGenerator};
use super::roi::{RoiAnalysis, RoiCalculator, RoiData, RoiInput};
use super::trust::{TrustBuilder, TrustData};
use crate::adaptability::{DEFAULT_INDUSTRY, DEFAULT_ROLE};
use crate::config::MarketingConfig;
use crate::error::{PitchwiseError, Result};
use crate::knowledge::KnowledgeBase;
use crate::types::{normalize_id, BusinessSize};

const PROPOSAL_TEMPLATE: &str = "proposal.md";

#[derive(Debug, Clone, Copy, Serialize)]
struct Phase {
    name: &'static str,
    when: &'static str,
    activity: &'static str,
}

const TIMELINE: [Phase; 7] = [
    Phase {
        name: "Discovery Phase",
        when: "Week 1-2",
        activity: "Detailed assessment of your specific requirements and integration points.",
    },
    Phase {
        name: "Configuration Phase",
        when: "Week 3-4",
        activity: "Customization of the AI agent to your specific business context.",
    },
    Phase {
        name: "Integration Phase",
        when: "Week 5-6",
        activity: "Integration with your existing systems and data sources.",
    },
    Phase {
        name: "Testing Phase",
        when: "Week 7-8",
        activity: "Comprehensive testing and validation of the AI agent.",
    },
    Phase {
        name: "Deployment Phase",
        when: "Week 9",
        activity: "Deployment of the AI agent to production.",
    },
    Phase {
        name: "Training Phase",
        when: "Week 10",
        activity: "Training of your team on using and managing the AI agent.",
    },
    Phase {
        name: "Optimization Phase",
        when: "Ongoing",
        activity: "Continuous improvement and optimization of the AI agent based on feedback and performance data.",
    },
];

const NEXT_STEPS: [&str; 4] = [
    "Schedule a detailed discovery meeting to discuss your specific requirements.",
    "Conduct a proof of concept demonstration with your actual data.",
    "Finalize implementation details and timeline.",
    "Begin the implementation process.",
];

fn default_industry() -> String {
    DEFAULT_INDUSTRY.to_string()
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Who the marketing material is for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingRequest {
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default)]
    pub business_size: BusinessSize,
    #[serde(default = "default_role")]
    pub role: String,
    /// Configured default when absent
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub employees: Option<u64>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl MarketingRequest {
    pub fn new(
        industry: impl Into<String>,
        business_size: BusinessSize,
        role: impl Into<String>,
    ) -> Self {
        Self {
            industry: industry.into(),
            business_size,
            role: role.into(),
            annual_revenue: None,
            employees: None,
            interests: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageContext {
    pub industry: String,
    pub business_size: BusinessSize,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub summary: String,
    pub detailed_data: RoiAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingPackage {
    pub business_context: PackageContext,
    pub value_propositions: Vec<String>,
    pub roi_analysis: RoiReport,
    pub capability_demonstration: String,
    pub competitive_comparison: String,
    pub trust_statement: String,
}

pub struct SelfMarketingModule {
    propositions: ValuePropositionGenerator,
    roi: RoiCalculator,
    capabilities: CapabilityShowcase,
    differentiators: CompetitiveDifferentiator,
    trust: TrustBuilder,
    settings: MarketingConfig,
    templates: Tera,
    rng: StdRng,
}

impl SelfMarketingModule {
    pub fn new(
        propositions: ValuePropositionGenerator,
        roi: RoiCalculator,
        capabilities: CapabilityShowcase,
        differentiators: CompetitiveDifferentiator,
        trust: TrustBuilder,
        settings: MarketingConfig,
    ) -> Result<Self> {
        let mut templates = Tera::default();
        templates.add_raw_template(PROPOSAL_TEMPLATE, include_str!("../../templates/proposal.md"))?;

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            propositions,
            roi,
            capabilities,
            differentiators,
            trust,
            settings,
            templates,
            rng,
        })
    }

    pub fn from_knowledge(kb: &KnowledgeBase, settings: &MarketingConfig) -> Result<Self> {
        Self::new(
            ValuePropositionGenerator::new(kb.propositions.clone())?,
            RoiCalculator::new(kb.roi.clone())?,
            CapabilityShowcase::new(kb.capabilities.clone())?,
            CompetitiveDifferentiator::new(kb.differentiators.clone())?,
            TrustBuilder::new(kb.trust.clone())?,
            settings.clone(),
        )
    }

    pub fn settings(&self) -> &MarketingConfig {
        &self.settings
    }

    /// Restart the random source, e.g. to reproduce an earlier run
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn propositions(&self) -> &ValuePropositionGenerator {
        &self.propositions
    }

    pub fn roi(&self) -> &RoiCalculator {
        &self.roi
    }

    pub fn capabilities(&self) -> &CapabilityShowcase {
        &self.capabilities
    }

    pub fn differentiators(&self) -> &CompetitiveDifferentiator {
        &self.differentiators
    }

    pub fn trust(&self) -> &TrustBuilder {
        &self.trust
    }

    pub fn value_propositions(
        &mut self,
        industry: &str,
        size: BusinessSize,
        role: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        self.propositions
            .generate_many(&mut self.rng, industry, size, role, count)
    }

    pub fn value_proposition(
        &mut self,
        industry: &str,
        size: BusinessSize,
        role: &str,
        custom: &BTreeMap<String, String>,
    ) -> Result<String> {
        self.propositions
            .generate(&mut self.rng, industry, size, role, custom)
    }

    pub fn capability_demonstration(
        &mut self,
        industry: &str,
        size: BusinessSize,
        interests: &[String],
        max: usize,
    ) -> String {
        self.capabilities
            .demonstration(&mut self.rng, industry, size, interests, max)
    }

    pub fn competitive_comparison(
        &mut self,
        industry: &str,
        size: BusinessSize,
        against: Competitor,
    ) -> String {
        self.differentiators
            .comparison(&mut self.rng, industry, size, against)
    }

    pub fn roi_input(&self, request: &MarketingRequest) -> RoiInput {
        RoiInput::new(
            request.industry.clone(),
            request.business_size,
            request.annual_revenue.unwrap_or(self.settings.annual_revenue),
            request
                .employees
                .unwrap_or_else(|| u64::from(self.settings.employees)),
        )
    }

    pub fn marketing_package(&mut self, request: &MarketingRequest) -> Result<MarketingPackage> {
        let industry = normalize_id(&request.industry);
        let role = normalize_id(&request.role);
        let size = request.business_size;

        let value_propositions =
            self.value_propositions(&industry, size, &role, self.settings.proposition_count)?;

        let detailed_data = self.roi.calculate(&self.roi_input(request))?;
        let summary = self.roi.summary(&detailed_data);

        let capability_demonstration = self.capability_demonstration(
            &industry,
            size,
            &request.interests,
            self.settings.max_capabilities,
        );
        let competitive_comparison = self.competitive_comparison(&industry, size, Competitor::All);
        let trust_statement = self.trust.statement(&industry, &self.settings.trust_focus);

        log::info!(
            "marketing package for {} / {} / {} with {} propositions",
            industry,
            size,
            role,
            value_propositions.len()
        );

        Ok(MarketingPackage {
            business_context: PackageContext {
                industry,
                business_size: size,
                role,
            },
            value_propositions,
            roi_analysis: RoiReport {
                summary,
                detailed_data,
            },
            capability_demonstration,
            competitive_comparison,
            trust_statement,
        })
    }

    pub fn elevator_pitch(
        &mut self,
        industry: &str,
        size: BusinessSize,
        role: &str,
    ) -> Result<String> {
        let proposition = self.value_proposition(industry, size, role, &BTreeMap::new())?;
        let relevant = self.capabilities.relevant(industry, size, &[]);
        let industry_label = normalize_id(industry).replace('_', " ");

        let mut pitch = format!(
            "Our AI agent is designed specifically for {} businesses in the {} industry. {} ",
            size.tier(),
            industry_label,
            proposition
        );
        if let Some(core) = relevant.core_capabilities.first() {
            pitch.push_str(&format!(
                "With {}, {}. ",
                core.name,
                core.description.to_lowercase()
            ));
        }
        if let Some(specific) = relevant.industry_capabilities.first() {
            pitch.push_str(&format!(
                "For {} specifically, we offer {}, {}. ",
                industry_label,
                specific.name,
                specific.description.to_lowercase()
            ));
        }
        pitch.push_str(
            "We'd be happy to provide a detailed demonstration of how our AI agent can benefit your specific business needs.",
        );
        Ok(pitch)
    }

    pub fn detailed_proposal(
        &mut self,
        request: &MarketingRequest,
        company: &str,
    ) -> Result<String> {
        let package = self.marketing_package(request)?;
        self.proposal_from_package(&package, company)
    }

    /// Render the proposal document around an already generated package
    pub fn proposal_from_package(
        &self,
        package: &MarketingPackage,
        company: &str,
    ) -> Result<String> {
        let company = company.trim();
        if company.is_empty() {
            return Err(PitchwiseError::invalid_input("company name cannot be empty"));
        }

        let mut context = Context::new();
        context.insert("company", company);
        context.insert("industry", &package.business_context.industry.replace('_', " "));
        context.insert("business_size", package.business_context.business_size.tier().as_str());
        context.insert("value_propositions", &package.value_propositions);
        context.insert("roi_summary", &package.roi_analysis.summary);
        context.insert("capability_demonstration", &package.capability_demonstration);
        context.insert("competitive_comparison", &package.competitive_comparison);
        context.insert("trust_statement", &package.trust_statement);
        context.insert("timeline", &TIMELINE);
        context.insert("next_steps", &NEXT_STEPS);

        Ok(self.templates.render(PROPOSAL_TEMPLATE, &context)?)
    }

    /// Route a dataset patch to the generator that owns it
    pub fn update(&mut self, dataset: &str, patch: &Value) -> Result<()> {
        use crate::knowledge::Dataset;

        match dataset {
            PropositionData::NAME => self.propositions.update(patch),
            RoiData::NAME => self.roi.update(patch),
            CapabilityData::NAME => self.capabilities.update(patch),
            DifferentiatorData::NAME => self.differentiators.update(patch),
            TrustData::NAME => self.trust.update(patch),
            other => Err(PitchwiseError::UnknownDataset {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn module(seed: u64) -> SelfMarketingModule {
        let settings = MarketingConfig {
            seed: Some(seed),
            ..MarketingConfig::default()
        };
        SelfMarketingModule::from_knowledge(&KnowledgeBase::embedded().unwrap(), &settings).unwrap()
    }

    #[test]
    fn test_marketing_package() {
        let mut module = module(7);
        let mut request = MarketingRequest::new("Retail", BusinessSize::Medium, "Executive");
        request.interests = vec!["inventory".to_string()];
        let package = module.marketing_package(&request).unwrap();

        assert_eq!(package.business_context.industry, "retail");
        assert_eq!(package.business_context.role, "executive");
        assert_eq!(package.value_propositions.len(), 3);
        // configured defaults: 1,000,000 revenue
        assert_eq!(package.roi_analysis.detailed_data.annual_benefits.revenue_increase.min, 50_000.0);
        assert!(package.roi_analysis.summary.starts_with("ROI Summary"));
        assert!(package.capability_demonstration.contains("1. Inventory Optimization"));
        assert!(package.competitive_comparison.contains("## Advantages Over Human-Performed Tasks"));
        assert!(package.trust_statement.contains("## Ethical AI Practices"));
    }

    #[test]
    fn test_package_is_reproducible_with_seed() {
        let request = MarketingRequest::new("finance", BusinessSize::Small, "manager");
        let a = module(21).marketing_package(&request).unwrap();
        let b = module(21).marketing_package(&request).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trust_focus_from_settings() {
        let settings = MarketingConfig {
            seed: Some(1),
            trust_focus: vec![crate::marketing::trust::TrustArea::Privacy],
            ..MarketingConfig::default()
        };
        let mut module =
            SelfMarketingModule::from_knowledge(&KnowledgeBase::embedded().unwrap(), &settings).unwrap();
        let package = module
            .marketing_package(&MarketingRequest::new("healthcare", BusinessSize::Large, "manager"))
            .unwrap();
        assert!(package.trust_statement.contains("## Privacy Protections"));
        assert!(!package.trust_statement.contains("## Security Measures"));
    }

    #[test]
    fn test_elevator_pitch() {
        let pitch = module(3)
            .elevator_pitch("retail", BusinessSize::Medium, "executive")
            .unwrap();
        assert!(pitch.starts_with("Our AI agent is designed specifically for medium businesses in the retail industry. "));
        assert!(pitch.contains("With Natural Language Processing, understanding and generating human language naturally. "));
        assert!(pitch.contains("For retail specifically, we offer Inventory Optimization, predicting optimal inventory levels. "));
        assert!(pitch.ends_with("benefit your specific business needs."));
    }

    #[test]
    fn test_detailed_proposal() {
        let mut module = module(5);
        let mut request = MarketingRequest::new("retail", BusinessSize::Medium, "executive");
        request.annual_revenue = Some(5_000_000.0);
        request.employees = Some(100);
        let proposal = module.detailed_proposal(&request, "Acme Retail Inc.").unwrap();

        assert!(proposal.starts_with("# AI Agent Implementation Proposal for Acme Retail Inc.\n\n## Executive Summary\n\n"));
        assert!(proposal.contains("key challenges in the retail industry. As a medium business, Acme Retail Inc."));
        assert!(proposal.contains("## Value Propositions\n\n1. "));
        assert!(proposal.contains("\n\n3. "));
        assert!(proposal.contains("## Return on Investment Analysis\n\nROI Summary\n"));
        assert!(proposal.contains("1. **Discovery Phase (Week 1-2)**: Detailed assessment"));
        assert!(proposal.contains("7. **Optimization Phase (Ongoing)**"));
        assert!(proposal.contains("## Next Steps\n\n1. Schedule a detailed discovery meeting"));
        assert!(proposal
            .trim_end()
            .ends_with("help drive success for your business."));

        let order = [
            "## Executive Summary",
            "## Value Propositions",
            "## Return on Investment Analysis",
            "## Capabilities Demonstration",
            "## Competitive Advantages",
            "## Trust and Security Considerations",
            "## Implementation Timeline",
            "## Next Steps",
        ];
        let positions: Vec<usize> = order.iter().map(|h| proposal.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_proposal_requires_company() {
        let mut module = module(5);
        let request = MarketingRequest::new("retail", BusinessSize::Medium, "executive");
        assert!(matches!(
            module.detailed_proposal(&request, "  "),
            Err(PitchwiseError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_update_routing() {
        let mut module = module(1);
        module
            .update("roi_metrics", &json!({"annual_subscription": {"amount": 6000}}))
            .unwrap();
        let analysis = module
            .roi()
            .calculate(&module.roi_input(&MarketingRequest::new("retail", BusinessSize::Medium, "manager")))
            .unwrap();
        assert_eq!(analysis.annual_subscription, 6_000.0);

        assert!(matches!(
            module.update("industries", &json!({})),
            Err(PitchwiseError::UnknownDataset { .. })
        ));
    }
}
