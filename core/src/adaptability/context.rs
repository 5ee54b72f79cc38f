//! Business context analysis and adaptation strategy
//!
//! [`BusinessContextAdapter`] runs the three analyzers over one request and
//! turns the resulting [`BusinessContext`] into an [`AdaptationStrategy`]:
//! what to talk about, which features to lead with and how to build trust.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::industry::{IndustryClassifier, IndustryMatch, ScoredIndustry};
use super::role::{CommunicationStrategy, RoleMatch, RoleMatches, RoleRecognizer};
use super::size::{BusinessSizeAnalyzer, MetricAssessment, SizeMetrics};
use super::{DEFAULT_INDUSTRY, DEFAULT_ROLE};
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::{Dataset, KnowledgeBase};
use crate::types::BusinessSize;

// ============================================================================
// Adaptation playbook data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryItems {
    pub industry: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeItems {
    pub size: BusinessSize,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleItems {
    pub role: String,
    pub items: Vec<String>,
}

/// Recommendations keyed by industry, size and role, plus a common base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industries: Vec<IndustryItems>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_sizes: Vec<SizeItems>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleItems>,
}

impl Playbook {
    /// Items for the industry, or the default industry's
    pub fn for_industry(&self, industry: &str) -> &[String] {
        self.industries
            .iter()
            .find(|e| e.industry == industry)
            .or_else(|| self.industries.iter().find(|e| e.industry == DEFAULT_INDUSTRY))
            .map(|e| e.items.as_slice())
            .unwrap_or_default()
    }

    /// Items for the size's tier, or medium's
    pub fn for_size(&self, size: BusinessSize) -> &[String] {
        size_items(&self.business_sizes, size)
    }

    /// Items for the organizational role, or manager's
    pub fn for_role(&self, role: &str) -> &[String] {
        self.roles
            .iter()
            .find(|e| e.role == role)
            .or_else(|| self.roles.iter().find(|e| e.role == DEFAULT_ROLE))
            .map(|e| e.items.as_slice())
            .unwrap_or_default()
    }
}

fn size_items(entries: &[SizeItems], size: BusinessSize) -> &[String] {
    entries
        .iter()
        .find(|e| e.size == size.tier())
        .or_else(|| entries.iter().find(|e| e.size == BusinessSize::Medium))
        .map(|e| e.items.as_slice())
        .unwrap_or_default()
}

/// Talking points for one trust area such as `security_emphasis`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEmphasis {
    pub area: String,
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryTrust {
    pub industry: String,
    pub areas: Vec<TrustEmphasis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTrust {
    pub role: String,
    pub areas: Vec<TrustEmphasis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustPlaybook {
    pub base: Vec<TrustEmphasis>,
    #[serde(default)]
    pub industries: Vec<IndustryTrust>,
    #[serde(default)]
    pub roles: Vec<RoleTrust>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptationData {
    pub implementation_approach: Vec<SizeItems>,
    pub recommended_capabilities: Playbook,
    pub integration_priorities: Playbook,
    pub value_proposition_focus: Playbook,
    pub roi_emphasis: Playbook,
    pub trust_approach: TrustPlaybook,
}

impl Dataset for AdaptationData {
    const NAME: &'static str = "adaptation";
    const EMBEDDED: &'static str = include_str!("../../data/adaptation.json");

    fn validate(&self) -> Result<()> {
        self.implementation_approach
            .iter()
            .find(|e| e.size == BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "a medium implementation approach is required")?;

        let industry_tables = [
            ("recommended_capabilities", &self.recommended_capabilities),
            ("integration_priorities", &self.integration_priorities),
            ("value_proposition_focus", &self.value_proposition_focus),
        ];
        for (name, playbook) in industry_tables {
            playbook
                .industries
                .iter()
                .find(|e| e.industry == DEFAULT_INDUSTRY)
                .ok_or_dataset(
                    Self::NAME,
                    format!("{} needs a '{}' entry", name, DEFAULT_INDUSTRY),
                )?;
        }
        if self.trust_approach.base.is_empty() {
            return Err(PitchwiseError::invalid_dataset(
                Self::NAME,
                "trust_approach.base is empty",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Analysis results
// ============================================================================

/// Everything known about the prospect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextRequest {
    pub business_description: String,
    pub job_title: String,
    #[serde(default)]
    pub employees: Option<u64>,
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub role_info: Option<String>,
    #[serde(default)]
    pub industry_metrics: BTreeMap<String, f64>,
}

impl ContextRequest {
    pub fn new(business_description: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            business_description: business_description.into(),
            job_title: job_title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(revenue) = self.annual_revenue {
            if !revenue.is_finite() || revenue < 0.0 {
                return Err(PitchwiseError::invalid_input(
                    "annual revenue must be a non-negative number",
                ));
            }
        }
        if let Some((name, _)) = self
            .industry_metrics
            .iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(PitchwiseError::invalid_input(format!(
                "industry metric '{}' must be a non-negative number",
                name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryContext {
    pub id: String,
    pub name: String,
    pub confidence: f64,
    pub sub_industry: Option<IndustryMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeContext {
    pub category: BusinessSize,
    pub confidence: f64,
    pub description: String,
    pub challenges: Vec<String>,
    pub opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub organizational: RoleMatch,
    pub functional: RoleMatch,
    pub industry_specific: Option<RoleMatch>,
    pub communication_strategy: CommunicationStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub industry_matches: Vec<ScoredIndustry>,
    pub size_metrics: Vec<MetricAssessment>,
    pub role_matches: RoleMatches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessContext {
    pub industry: IndustryContext,
    pub business_size: SizeContext,
    pub user_role: UserRole,
    pub detailed_analysis: DetailedAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryFocus {
    pub primary_topics: Vec<String>,
    pub sub_industry_focus: Option<String>,
    pub industry_challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeAdaptation {
    pub resource_considerations: Vec<String>,
    pub opportunity_focus: Vec<String>,
    pub implementation_approach: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCommunication {
    pub content_focus: Vec<String>,
    pub presentation_style: Vec<String>,
    pub language_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAdaptation {
    pub industry_focus: IndustryFocus,
    pub business_size_adaptation: SizeAdaptation,
    pub role_based_communication: RoleCommunication,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceCustomization {
    pub layout: String,
    pub data_visualization: String,
    pub navigation: String,
    pub interaction_mode: String,
    pub notification_style: String,
    pub technical_features: String,
    pub terminology: String,
    pub tools_integration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAdaptation {
    pub recommended_capabilities: Vec<String>,
    pub interface_customization: InterfaceCustomization,
    pub integration_priorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementStrategy {
    pub value_proposition_focus: Vec<String>,
    pub roi_emphasis: Vec<String>,
    pub trust_building_approach: Vec<TrustEmphasis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationStrategy {
    pub content_adaptation: ContentAdaptation,
    pub feature_adaptation: FeatureAdaptation,
    pub engagement_strategy: EngagementStrategy,
}

// ============================================================================
// Adapter
// ============================================================================

pub struct BusinessContextAdapter {
    industries: IndustryClassifier,
    sizes: BusinessSizeAnalyzer,
    roles: RoleRecognizer,
    playbook: AdaptationData,
}

impl BusinessContextAdapter {
    pub fn new(
        industries: IndustryClassifier,
        sizes: BusinessSizeAnalyzer,
        roles: RoleRecognizer,
        playbook: AdaptationData,
    ) -> Result<Self> {
        playbook.validate()?;
        Ok(Self {
            industries,
            sizes,
            roles,
            playbook,
        })
    }

    pub fn from_knowledge(kb: &KnowledgeBase) -> Result<Self> {
        Self::new(
            IndustryClassifier::new(kb.industries.clone())?,
            BusinessSizeAnalyzer::new(kb.sizes.clone())?,
            RoleRecognizer::new(kb.roles.clone())?,
            kb.adaptation.clone(),
        )
    }

    pub fn industries(&self) -> &IndustryClassifier {
        &self.industries
    }

    pub fn sizes(&self) -> &BusinessSizeAnalyzer {
        &self.sizes
    }

    pub fn roles(&self) -> &RoleRecognizer {
        &self.roles
    }

    pub fn analyze(&self, request: &ContextRequest) -> Result<BusinessContext> {
        request.validate()?;

        let classification = self
            .industries
            .classify(&request.business_description, &request.keywords);
        let industry_id = classification.primary_industry.id.clone();

        let size = self.sizes.analyze(
            &industry_id,
            &SizeMetrics {
                employees: request.employees,
                annual_revenue: request.annual_revenue,
                additional: request.industry_metrics.clone(),
            },
        );
        let role = self
            .roles
            .recognize(&request.job_title, request.role_info.as_deref(), Some(&industry_id));

        log::info!(
            "business context: {} / {} / {}",
            industry_id,
            size.size_category,
            role.organizational_role.id
        );

        Ok(BusinessContext {
            industry: IndustryContext {
                id: classification.primary_industry.id,
                name: classification.primary_industry.name,
                confidence: classification.primary_industry.confidence,
                sub_industry: classification.sub_industry,
            },
            business_size: SizeContext {
                category: size.size_category,
                confidence: size.confidence,
                description: size.description,
                challenges: size.challenges,
                opportunities: size.opportunities,
            },
            user_role: UserRole {
                organizational: role.organizational_role,
                functional: role.functional_role,
                industry_specific: role.industry_specific_role,
                communication_strategy: role.communication_strategy,
            },
            detailed_analysis: DetailedAnalysis {
                industry_matches: classification.all_matches,
                size_metrics: size.metrics_analysis,
                role_matches: role.all_matches,
            },
        })
    }

    pub fn adaptation_strategy(&self, context: &BusinessContext) -> AdaptationStrategy {
        let industry_id = context.industry.id.as_str();
        let name = context.industry.name.as_str();
        let size = context.business_size.category;
        let org_role = context.user_role.organizational.id.as_str();
        let func_role = context.user_role.functional.id.as_str();

        let industry = self.industries.industry_information(industry_id);
        let profile = self.sizes.size_information(size);
        let communication = self.roles.communication_strategy(org_role);
        let playbook = &self.playbook;

        let content_adaptation = ContentAdaptation {
            industry_focus: IndustryFocus {
                primary_topics: industry.keywords.iter().take(5).cloned().collect(),
                sub_industry_focus: context.industry.sub_industry.as_ref().map(|s| s.name.clone()),
                industry_challenges: vec![
                    format!("Addressing {} industry regulations and compliance requirements", name),
                    format!("Managing {}-specific customer expectations", name),
                    format!("Optimizing {} business processes and workflows", name),
                    format!("Leveraging technology effectively in the {} sector", name),
                    format!("Staying competitive in the evolving {} landscape", name),
                ],
            },
            business_size_adaptation: SizeAdaptation {
                resource_considerations: profile.challenges.clone(),
                opportunity_focus: profile.opportunities.clone(),
                implementation_approach: size_items(&playbook.implementation_approach, size)
                    .to_vec(),
            },
            role_based_communication: RoleCommunication {
                content_focus: communication.content_focus.clone(),
                presentation_style: communication.presentation_style.clone(),
                language_patterns: communication.language_patterns.clone(),
            },
        };

        let capabilities = &playbook.recommended_capabilities;
        let integrations = &playbook.integration_priorities;
        let feature_adaptation = FeatureAdaptation {
            recommended_capabilities: concat([
                capabilities.base.as_slice(),
                capabilities.for_industry(industry_id),
                capabilities.for_size(size),
                capabilities.for_role(org_role),
            ]),
            interface_customization: interface_customization(org_role, func_role),
            integration_priorities: concat([
                integrations.base.as_slice(),
                integrations.for_industry(industry_id),
                integrations.for_size(size),
            ]),
        };

        let focus = &playbook.value_proposition_focus;
        let roi = &playbook.roi_emphasis;
        let engagement_strategy = EngagementStrategy {
            value_proposition_focus: concat([
                first(focus.for_industry(industry_id), 2),
                first(focus.for_size(size), 2),
                first(focus.for_role(org_role), 2),
            ]),
            roi_emphasis: concat([first(roi.for_role(org_role), 3), first(roi.for_size(size), 3)]),
            trust_building_approach: self.trust_approach(industry_id, org_role),
        };

        AdaptationStrategy {
            content_adaptation,
            feature_adaptation,
            engagement_strategy,
        }
    }

    /// Base trust areas, then industry areas, then role areas; a later area
    /// with the same name replaces the earlier points
    fn trust_approach(&self, industry: &str, role: &str) -> Vec<TrustEmphasis> {
        let trust = &self.playbook.trust_approach;
        let mut areas = trust.base.clone();

        let industry_areas = trust
            .industries
            .iter()
            .filter(|t| t.industry == industry)
            .flat_map(|t| t.areas.iter());
        let role_areas = trust
            .roles
            .iter()
            .filter(|t| t.role == role)
            .flat_map(|t| t.areas.iter());

        for overlay in industry_areas.chain(role_areas) {
            match areas.iter_mut().find(|a| a.area == overlay.area) {
                Some(existing) => existing.points = overlay.points.clone(),
                None => areas.push(overlay.clone()),
            }
        }
        areas
    }

    /// Route a dataset update to the component that owns it
    pub fn update(&mut self, dataset: &str, patch: &Value) -> Result<()> {
        use super::industry::IndustryData;
        use super::role::RoleData;
        use super::size::SizeData;

        match dataset {
            IndustryData::NAME => self.industries.update(patch),
            SizeData::NAME => self.sizes.update(patch),
            RoleData::NAME => self.roles.update(patch),
            AdaptationData::NAME => {
                self.playbook = self.playbook.merged(patch)?;
                Ok(())
            }
            other => Err(PitchwiseError::UnknownDataset {
                name: other.to_string(),
            }),
        }
    }
}

fn first(items: &[String], n: usize) -> &[String] {
    &items[..items.len().min(n)]
}

fn concat<const N: usize>(parts: [&[String]; N]) -> Vec<String> {
    parts.iter().flat_map(|p| p.iter().cloned()).collect()
}

fn interface_customization(org_role: &str, func_role: &str) -> InterfaceCustomization {
    let (layout, data_visualization, navigation, interaction_mode, notification_style) =
        match org_role {
            "executive" => (
                "Executive dashboard with high-level KPIs and strategic insights",
                "Visual-focused with emphasis on trends and comparisons",
                "Simplified navigation with focus on strategic areas",
                "Concise interactions with option for detailed exploration",
                "High-priority notifications only with executive summaries",
            ),
            "specialist" => (
                "Detailed technical dashboard with comprehensive data access",
                "Detailed data tables with technical visualizations",
                "Deep navigation structure with technical categorization",
                "Technical query capability with specialized terminology",
                "Detailed notifications with technical specifics",
            ),
            _ => (
                "Standard dashboard layout with customizable widgets",
                "Balanced mix of charts, tables, and summary metrics",
                "Context-aware navigation with recent items",
                "Conversational with option for structured inputs",
                "Balanced notification frequency and detail",
            ),
        };

    let (technical_features, terminology, tools_integration) = match func_role {
        "technology" => (
            "Code integration, API access, and technical documentation",
            "Technical terminology and industry-standard nomenclature",
            "Development environment and technical tool integrations",
        ),
        "marketing" => (
            "Campaign analytics, content management, and audience insights",
            "Marketing terminology and metrics",
            "Marketing platform and analytics tool integrations",
        ),
        "sales" => (
            "Pipeline management, customer tracking, and deal analytics",
            "Sales terminology and metrics",
            "CRM and sales tool integrations",
        ),
        "finance" => (
            "Financial reporting, budget tracking, and forecast modeling",
            "Financial terminology and metrics",
            "Accounting system and financial tool integrations",
        ),
        _ => (
            "Role-specific tools and analytics",
            "Industry-standard terminology",
            "Common business tool integrations",
        ),
    };

    InterfaceCustomization {
        layout: layout.to_string(),
        data_visualization: data_visualization.to_string(),
        navigation: navigation.to_string(),
        interaction_mode: interaction_mode.to_string(),
        notification_style: notification_style.to_string(),
        technical_features: technical_features.to_string(),
        terminology: terminology.to_string(),
        tools_integration: tools_integration.to_string(),
    }
}
