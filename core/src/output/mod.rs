//! Output formatting module
//!
//! Renders engine results as styled text, JSON or YAML.

use console::Style;
use serde::Serialize;

use crate::adaptability::{AdaptationStrategy, BusinessContext};
use crate::engine::Recommendation;
use crate::error::Result;
use crate::marketing::MarketingPackage;
use crate::types::OutputFormat;

/// Output formatter for CLI results
pub struct OutputFormatter {
    format: OutputFormat,
    // Styles
    blue: Style,
    green: Style,
    yellow: Style,
    bold: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            blue: Style::new().blue(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            bold: Style::new().bold(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Serialize `value`, or call `text` for the text format
    pub fn render<T, F>(&self, value: &T, text: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self) -> String,
    {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yml::to_string(value)?),
            OutputFormat::Text => Ok(text(self)),
        }
    }

    /// Print a rendered result
    pub fn emit<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self) -> String,
    {
        let rendered = self.render(value, text)?;
        println!("{}", rendered.trim_end());
        Ok(())
    }

    pub fn heading(&self, title: &str) -> String {
        format!("{}\n", self.bold.apply_to(title))
    }

    fn field(&self, label: &str, value: impl std::fmt::Display) -> String {
        format!("{}: {}\n", label, self.green.apply_to(value))
    }

    fn list(&self, label: &str, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let mut out = format!("{}\n", self.blue.apply_to(label));
        for item in items {
            out.push_str(&format!("  - {}\n", item));
        }
        out
    }

    pub fn context_text(&self, context: &BusinessContext) -> String {
        let mut out = self.heading("Business Context:");

        let industry = &context.industry;
        out.push_str(&self.field(
            "Industry",
            format!("{} ({:.2}%)", industry.name, industry.confidence),
        ));
        if let Some(sub) = &industry.sub_industry {
            let value = format!("{} ({:.2}%)", sub.name, sub.confidence);
            out.push_str(&self.field("Sub-industry", value));
        }

        let size = &context.business_size;
        out.push_str(&self.field("Size", format!("{} ({:.2}%)", size.category, size.confidence)));
        out.push_str(&format!("  {}\n", size.description));

        let role = &context.user_role;
        out.push_str(&self.field(
            "Role",
            format!("{} / {}", role.organizational.name, role.functional.name),
        ));
        if let Some(specific) = &role.industry_specific {
            out.push_str(&self.field("Industry role", &specific.name));
        }

        out.push_str(&self.list("Challenges:", &size.challenges));
        out.push_str(&self.list("Opportunities:", &size.opportunities));
        out
    }

    pub fn strategy_text(&self, strategy: &AdaptationStrategy) -> String {
        let content = &strategy.content_adaptation;
        let features = &strategy.feature_adaptation;
        let engagement = &strategy.engagement_strategy;

        let mut out = self.heading("Adaptation Strategy:");
        out.push_str(&self.list("Primary topics:", &content.industry_focus.primary_topics));
        if let Some(sub) = &content.industry_focus.sub_industry_focus {
            out.push_str(&self.field("Sub-industry focus", sub));
        }
        out.push_str(&self.list(
            "Implementation approach:",
            &content.business_size_adaptation.implementation_approach,
        ));
        out.push_str(&self.list(
            "Presentation style:",
            &content.role_based_communication.presentation_style,
        ));
        out.push_str(&self.list("Recommended capabilities:", &features.recommended_capabilities));
        out.push_str(&self.list("Integration priorities:", &features.integration_priorities));

        let ui = &features.interface_customization;
        out.push_str(&format!("{}\n", self.blue.apply_to("Interface:")));
        out.push_str(&format!("  layout: {}\n", ui.layout));
        out.push_str(&format!("  visualization: {}\n", ui.data_visualization));
        out.push_str(&format!("  tools: {}\n", ui.tools_integration));

        out.push_str(&self.list("Value proposition focus:", &engagement.value_proposition_focus));
        out.push_str(&self.list("ROI emphasis:", &engagement.roi_emphasis));
        for emphasis in &engagement.trust_building_approach {
            out.push_str(&self.list(&format!("Trust ({}):", emphasis.area), &emphasis.points));
        }
        out
    }

    pub fn package_text(&self, package: &MarketingPackage) -> String {
        let context = &package.business_context;
        let mut out = self.heading(&format!(
            "Marketing Package: {} / {} / {}",
            context.industry, context.business_size, context.role
        ));
        out.push('\n');
        out.push_str(&format!("{}\n", self.blue.apply_to("Value Propositions:")));
        for (i, proposition) in package.value_propositions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, proposition));
        }
        for section in [
            &package.roi_analysis.summary,
            &package.capability_demonstration,
            &package.competitive_comparison,
            &package.trust_statement,
        ] {
            out.push('\n');
            out.push_str(section.trim_end());
            out.push('\n');
        }
        out
    }

    pub fn recommendation_text(&self, recommendation: &Recommendation) -> String {
        let mut out = self.context_text(&recommendation.business_context);
        out.push('\n');
        out.push_str(&self.strategy_text(&recommendation.adaptation_strategy));
        out.push('\n');
        out.push_str(&self.package_text(&recommendation.marketing_package));
        if let Some(proposal) = &recommendation.proposal {
            out.push('\n');
            out.push_str(proposal);
        }
        out
    }

    pub fn success(&self, message: &str) -> String {
        format!("{} {}", self.green.apply_to("[ok]"), message)
    }

    pub fn warning(&self, message: &str) -> String {
        format!("{} {}", self.yellow.apply_to("[!!]"), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptability::{BusinessContextAdapter, ContextRequest};
    use crate::knowledge::KnowledgeBase;

    fn context() -> (BusinessContext, AdaptationStrategy) {
        let adapter =
            BusinessContextAdapter::from_knowledge(&KnowledgeBase::embedded().unwrap()).unwrap();
        let mut request = ContextRequest::new(
            "We are a retail company selling electronics and home appliances through our chain of stores and e-commerce website.",
            "Marketing Manager",
        );
        request.employees = Some(15);
        let context = adapter.analyze(&request).unwrap();
        let strategy = adapter.adaptation_strategy(&context);
        (context, strategy)
    }

    #[test]
    fn test_json_and_yaml() {
        let (context, _) = context();
        let json = OutputFormatter::new(OutputFormat::Json)
            .render(&context, |_| unreachable!())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["industry"]["id"], "retail");

        let yaml = OutputFormatter::new(OutputFormat::Yaml)
            .render(&context, |_| unreachable!())
            .unwrap();
        assert!(yaml.contains("id: retail"));
    }

    #[test]
    fn test_text_context() {
        let (context, strategy) = context();
        let formatter = OutputFormatter::default();
        let text = formatter.render(&context, |f| f.context_text(&context)).unwrap();
        assert!(text.contains("Business Context:"));
        assert!(text.contains("Retail (85.71%)"));
        assert!(text.contains("Challenges:"));

        let text = formatter.strategy_text(&strategy);
        assert!(text.contains("Recommended capabilities:"));
        assert!(text.contains("  - "));
    }
}
