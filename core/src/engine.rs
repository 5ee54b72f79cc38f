//! The engine ties the adaptability and marketing layers to one knowledge base

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adaptability::context::AdaptationData;
use crate::adaptability::industry::IndustryData;
use crate::adaptability::role::RoleData;
use crate::adaptability::size::SizeData;
use crate::adaptability::{
    AdaptationStrategy, BusinessContext, BusinessContextAdapter, ContextRequest,
};
use crate::config::Config;
use crate::error::Result;
use crate::knowledge::{Dataset, KnowledgeBase};
use crate::marketing::{MarketingPackage, MarketingRequest, SelfMarketingModule};

/// A prospect description plus what to produce for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(flatten)]
    pub context: ContextRequest,
    /// Capability interests; the context keywords are used when empty
    #[serde(default)]
    pub interests: Vec<String>,
    /// A proposal is rendered when a company name is given
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub business_context: BusinessContext,
    pub adaptation_strategy: AdaptationStrategy,
    pub marketing_package: MarketingPackage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<String>,
}

pub struct Engine {
    config: Config,
    knowledge: KnowledgeBase,
    adapter: BusinessContextAdapter,
    marketing: SelfMarketingModule,
}

impl Engine {
    pub fn new(knowledge: KnowledgeBase, config: Config) -> Result<Self> {
        let adapter = BusinessContextAdapter::from_knowledge(&knowledge)?;
        let marketing = SelfMarketingModule::from_knowledge(&knowledge, &config.marketing)?;
        Ok(Self {
            config,
            knowledge,
            adapter,
            marketing,
        })
    }

    /// Load the knowledge base from the configured data directory
    pub fn from_config(config: Config) -> Result<Self> {
        let knowledge = KnowledgeBase::load(config.knowledge.data_dir.as_deref())?;
        Self::new(knowledge, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn adapter(&self) -> &BusinessContextAdapter {
        &self.adapter
    }

    pub fn marketing(&mut self) -> &mut SelfMarketingModule {
        &mut self.marketing
    }

    pub fn analyze(&self, request: &ContextRequest) -> Result<BusinessContext> {
        self.adapter.analyze(request)
    }

    pub fn strategy(&self, context: &BusinessContext) -> AdaptationStrategy {
        self.adapter.adaptation_strategy(context)
    }

    /// The marketing request matching an analyzed context
    pub fn marketing_request(
        &self,
        context: &BusinessContext,
        request: &RecommendRequest,
    ) -> MarketingRequest {
        let interests = if request.interests.is_empty() {
            request.context.keywords.clone()
        } else {
            request.interests.clone()
        };
        MarketingRequest {
            industry: context.industry.id.clone(),
            business_size: context.business_size.category,
            role: context.user_role.organizational.id.clone(),
            annual_revenue: request.context.annual_revenue,
            employees: request.context.employees,
            interests,
        }
    }

    pub fn recommend(&mut self, request: &RecommendRequest) -> Result<Recommendation> {
        let business_context = self.analyze(&request.context)?;
        let adaptation_strategy = self.strategy(&business_context);
        let marketing_request = self.marketing_request(&business_context, request);
        let marketing_package = self.marketing.marketing_package(&marketing_request)?;

        let proposal = match request.company.as_deref() {
            Some(company) => Some(
                self.marketing
                    .proposal_from_package(&marketing_package, company)?,
            ),
            None => None,
        };

        log::info!(
            "recommendation for {} ({}) with role {}",
            business_context.industry.id,
            business_context.business_size.category,
            business_context.user_role.organizational.id
        );

        Ok(Recommendation {
            business_context,
            adaptation_strategy,
            marketing_package,
            proposal,
        })
    }

    /// Merge a patch into a dataset and refresh the component that reads it
    ///
    /// Nothing is written to disk; see [`KnowledgeBase::save_dataset`].
    pub fn update_dataset(&mut self, name: &str, patch: &Value) -> Result<()> {
        self.knowledge.update(name, patch)?;
        match name {
            IndustryData::NAME | SizeData::NAME | RoleData::NAME | AdaptationData::NAME => {
                self.adapter.update(name, patch)
            }
            _ => self.marketing.update(name, patch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PitchwiseError;
    use crate::types::BusinessSize;
    use serde_json::json;

    fn engine() -> Engine {
        let mut config = Config::default();
        config.marketing.seed = Some(99);
        Engine::new(KnowledgeBase::embedded().unwrap(), config).unwrap()
    }

    fn retail_request() -> RecommendRequest {
        let mut context = ContextRequest::new(
            "We are a retail company selling electronics and home appliances through our chain of stores and e-commerce website.",
            "CEO",
        );
        context.employees = Some(120);
        context.annual_revenue = Some(30_000_000.0);
        RecommendRequest {
            context,
            ..Default::default()
        }
    }

    #[test]
    fn test_recommend_without_company() {
        let mut engine = engine();
        let recommendation = engine.recommend(&retail_request()).unwrap();

        assert_eq!(recommendation.business_context.industry.id, "retail");
        assert_eq!(recommendation.marketing_package.business_context.industry, "retail");
        assert_eq!(recommendation.marketing_package.business_context.role, "executive");
        assert_eq!(
            recommendation.marketing_package.roi_analysis.detailed_data.annual_benefits.revenue_increase.min,
            1_500_000.0
        );
        assert!(recommendation.proposal.is_none());
    }

    #[test]
    fn test_recommend_with_company() {
        let mut engine = engine();
        let mut request = retail_request();
        request.company = Some("Volt Stores".to_string());
        let recommendation = engine.recommend(&request).unwrap();
        let proposal = recommendation.proposal.unwrap();
        assert!(proposal.starts_with("# AI Agent Implementation Proposal for Volt Stores"));
    }

    #[test]
    fn test_keywords_become_interests() {
        let engine = engine();
        let mut request = retail_request();
        request.context.keywords = vec!["inventory".to_string()];
        let context = engine.analyze(&request.context).unwrap();
        let marketing = engine.marketing_request(&context, &request);
        assert_eq!(marketing.interests, vec!["inventory".to_string()]);
        assert_eq!(marketing.business_size, BusinessSize::Medium);

        request.interests = vec!["fraud".to_string()];
        assert_eq!(
            engine.marketing_request(&context, &request).interests,
            vec!["fraud".to_string()]
        );
    }

    #[test]
    fn test_invalid_request_is_rejected() {
        let mut engine = engine();
        let mut request = retail_request();
        request.context.annual_revenue = Some(-5.0);
        assert!(matches!(
            engine.recommend(&request),
            Err(PitchwiseError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_update_dataset_reaches_components() {
        let mut engine = engine();
        engine
            .update_dataset(
                "industries",
                &json!({"industries": [{"id": "hospitality", "keywords": ["vineyard", "winery"]}]}),
            )
            .unwrap();
        let context = engine
            .analyze(&ContextRequest::new("A family vineyard and winery", "Owner"))
            .unwrap();
        assert_eq!(context.industry.id, "hospitality");
        assert!(engine
            .knowledge()
            .industries
            .industry("hospitality")
            .unwrap()
            .keywords
            .contains(&"winery".to_string()));

        engine
            .update_dataset("roi_metrics", &json!({"annual_subscription": {"amount": 7500}}))
            .unwrap();
        assert_eq!(engine.knowledge().roi.annual_subscription.amount, 7_500.0);
        assert_eq!(engine.marketing().roi().data().annual_subscription.amount, 7_500.0);

        assert!(engine.update_dataset("weather", &json!({})).is_err());
    }
}
