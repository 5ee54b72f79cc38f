//! Return on investment estimates

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adaptability::DEFAULT_INDUSTRY;
use crate::error::{OptionExt, PitchwiseError, Result};
use crate::knowledge::text::{format_amount, round_to, underlined};
use crate::knowledge::Dataset;
use crate::types::{normalize_id, BusinessSize};

/// Share of revenue spent on operations when no costs are given
const OPERATIONAL_SHARE: f64 = 0.75;
const LABOR_SHARE_OF_OPERATIONS: f64 = 0.4;
const OTHER_SHARE_OF_OPERATIONS: f64 = 0.6;
/// Defaults for a partially filled `CurrentCosts`
const LABOR_SHARE_OF_REVENUE: f64 = 0.3;
const OTHER_SHARE_OF_REVENUE: f64 = 0.45;

const PAYBACK_FALLBACK_MIN: f64 = 12.0;
const PAYBACK_FALLBACK_MAX: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentRange {
    pub min_percent: f64,
    pub max_percent: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRoi {
    pub id: String,
    pub time_savings: PercentRange,
    pub cost_reduction: PercentRange,
    pub revenue_increase: PercentRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRoi {
    pub size: BusinessSize,
    pub implementation_cost_factor: f64,
    pub time_to_roi_months: MonthRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiData {
    pub industries: Vec<IndustryRoi>,
    pub business_sizes: Vec<SizeRoi>,
    pub base_implementation_cost: Money,
    pub annual_subscription: Money,
}

impl RoiData {
    fn industry(&self, id: &str) -> Option<&IndustryRoi> {
        self.industries.iter().find(|i| i.id == id)
    }

    fn size(&self, size: BusinessSize) -> Option<&SizeRoi> {
        self.business_sizes.iter().find(|s| s.size == size)
    }
}

impl Dataset for RoiData {
    const NAME: &'static str = "roi_metrics";
    const EMBEDDED: &'static str = include_str!("../../data/roi_metrics.json");

    fn validate(&self) -> Result<()> {
        self.industry(DEFAULT_INDUSTRY)
            .ok_or_dataset(Self::NAME, format!("'{}' metrics are required", DEFAULT_INDUSTRY))?;
        self.size(BusinessSize::Medium)
            .ok_or_dataset(Self::NAME, "medium size metrics are required")?;
        let subscription = self.annual_subscription.amount;
        if !subscription.is_finite() || subscription <= 0.0 {
            return Err(PitchwiseError::invalid_dataset(
                Self::NAME,
                "annual subscription must be positive",
            ));
        }
        let base = self.base_implementation_cost.amount;
        if !base.is_finite() || base < 0.0 {
            return Err(PitchwiseError::invalid_dataset(
                Self::NAME,
                "base implementation cost cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Known operating costs; a missing part is estimated from revenue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentCosts {
    #[serde(default)]
    pub labor: Option<f64>,
    #[serde(default)]
    pub other: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiInput {
    pub industry: String,
    pub size: BusinessSize,
    pub annual_revenue: f64,
    pub employees: u64,
    #[serde(default)]
    pub current_costs: Option<CurrentCosts>,
}

impl RoiInput {
    pub fn new(
        industry: impl Into<String>,
        size: BusinessSize,
        annual_revenue: f64,
        employees: u64,
    ) -> Self {
        Self {
            industry: industry.into(),
            size,
            annual_revenue,
            employees,
            current_costs: None,
        }
    }

    fn validate(&self) -> Result<()> {
        check_amount("annual revenue", self.annual_revenue)?;
        if let Some(costs) = &self.current_costs {
            if let Some(labor) = costs.labor {
                check_amount("labor costs", labor)?;
            }
            if let Some(other) = costs.other {
                check_amount("other costs", other)?;
            }
        }
        Ok(())
    }
}

fn check_amount(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PitchwiseError::invalid_input(format!(
            "{} must be a non-negative number, got {}",
            what, value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn rounded(min: f64, max: f64, places: i32) -> Self {
        Self {
            min: round_to(min, places),
            max: round_to(max, places),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub min: f64,
    pub max: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualBenefits {
    pub labor_savings: Benefit,
    pub operational_savings: Benefit,
    pub revenue_increase: Benefit,
    pub total_benefit: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiPercentages {
    pub first_year: Range,
    pub subsequent_years: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiAnalysis {
    pub industry: String,
    pub business_size: BusinessSize,
    pub implementation_cost: f64,
    pub annual_subscription: f64,
    pub total_first_year_cost: f64,
    pub annual_benefits: AnnualBenefits,
    pub roi: RoiPercentages,
    pub payback_period_months: Range,
    /// Typical range observed for businesses of this size
    pub typical_time_to_roi_months: MonthRange,
    pub currency: String,
}

pub struct RoiCalculator {
    data: RoiData,
}

impl RoiCalculator {
    pub fn new(data: RoiData) -> Result<Self> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &RoiData {
        &self.data
    }

    pub fn calculate(&self, input: &RoiInput) -> Result<RoiAnalysis> {
        input.validate()?;

        let industry_id = normalize_id(&input.industry);
        let industry = self
            .data
            .industry(&industry_id)
            .or_else(|| self.data.industry(DEFAULT_INDUSTRY))
            .ok_or_dataset(RoiData::NAME, "no industry metrics")?;
        let size = self
            .data
            .size(input.size.tier())
            .or_else(|| self.data.size(BusinessSize::Medium))
            .ok_or_dataset(RoiData::NAME, "no size metrics")?;

        let implementation_cost =
            self.data.base_implementation_cost.amount * size.implementation_cost_factor;
        let subscription = self.data.annual_subscription.amount;
        let first_year_cost = implementation_cost + subscription;

        let revenue = input.annual_revenue;
        let (labor, other) = match &input.current_costs {
            None => {
                let operational = revenue * OPERATIONAL_SHARE;
                (
                    operational * LABOR_SHARE_OF_OPERATIONS,
                    operational * OTHER_SHARE_OF_OPERATIONS,
                )
            }
            Some(costs) => (
                costs.labor.unwrap_or(revenue * LABOR_SHARE_OF_REVENUE),
                costs.other.unwrap_or(revenue * OTHER_SHARE_OF_REVENUE),
            ),
        };

        let share = |base: f64, range: &PercentRange| {
            (base * range.min_percent / 100.0, base * range.max_percent / 100.0)
        };
        let (labor_min, labor_max) = share(labor, &industry.time_savings);
        let (other_min, other_max) = share(other, &industry.cost_reduction);
        let (revenue_min, revenue_max) = share(revenue, &industry.revenue_increase);

        let benefit_min = labor_min + other_min + revenue_min;
        let benefit_max = labor_max + other_max + revenue_max;

        let roi_over = |benefit: f64, cost: f64| (benefit - cost) / cost * 100.0;
        let payback = |benefit: f64, fallback: f64| {
            if benefit > 0.0 {
                first_year_cost / (benefit / 12.0)
            } else {
                fallback
            }
        };

        let benefit = |min: f64, max: f64, range: &PercentRange| Benefit {
            min: round_to(min, 2),
            max: round_to(max, 2),
            description: range.description.clone(),
        };

        log::debug!(
            "roi for {} ({}): benefit {:.2}..{:.2} against first year cost {:.2}",
            industry.id,
            size.size,
            benefit_min,
            benefit_max,
            first_year_cost
        );

        Ok(RoiAnalysis {
            industry: industry.id.clone(),
            business_size: size.size,
            implementation_cost: round_to(implementation_cost, 2),
            annual_subscription: round_to(subscription, 2),
            total_first_year_cost: round_to(first_year_cost, 2),
            annual_benefits: AnnualBenefits {
                labor_savings: benefit(labor_min, labor_max, &industry.time_savings),
                operational_savings: benefit(other_min, other_max, &industry.cost_reduction),
                revenue_increase: benefit(revenue_min, revenue_max, &industry.revenue_increase),
                total_benefit: Range::rounded(benefit_min, benefit_max, 2),
            },
            roi: RoiPercentages {
                first_year: Range::rounded(
                    roi_over(benefit_min, first_year_cost),
                    roi_over(benefit_max, first_year_cost),
                    2,
                ),
                subsequent_years: Range::rounded(
                    roi_over(benefit_min, subscription),
                    roi_over(benefit_max, subscription),
                    2,
                ),
            },
            payback_period_months: Range::rounded(
                payback(benefit_max, PAYBACK_FALLBACK_MIN),
                payback(benefit_min, PAYBACK_FALLBACK_MAX),
                1,
            ),
            typical_time_to_roi_months: size.time_to_roi_months,
            currency: self.data.base_implementation_cost.currency.clone(),
        })
    }

    pub fn summary(&self, analysis: &RoiAnalysis) -> String {
        let currency = &analysis.currency;
        let money = |value: f64| format!("{} {}", currency, format_amount(value));
        let span = |min: f64, max: f64| format!("{} to {}", money(min), money(max));
        let benefits = &analysis.annual_benefits;

        let mut out = underlined("ROI Summary");
        out.push_str("\n\nInvestment:\n");
        out.push_str(&format!("- Implementation Cost: {}\n", money(analysis.implementation_cost)));
        out.push_str(&format!("- Annual Subscription: {}\n", money(analysis.annual_subscription)));
        out.push_str(&format!(
            "- Total First Year Cost: {}\n\n",
            money(analysis.total_first_year_cost)
        ));

        out.push_str("Annual Benefits:\n");
        for (label, item) in [
            ("Labor Savings", &benefits.labor_savings),
            ("Operational Savings", &benefits.operational_savings),
            ("Revenue Increase", &benefits.revenue_increase),
        ] {
            out.push_str(&format!(
                "- {}: {}\n  ({})\n\n",
                label,
                span(item.min, item.max),
                item.description
            ));
        }
        out.push_str(&format!(
            "- Total Annual Benefit: {}\n\n",
            span(benefits.total_benefit.min, benefits.total_benefit.max)
        ));

        out.push_str("Return on Investment:\n");
        out.push_str(&format!(
            "- First Year ROI: {}% to {}%\n",
            analysis.roi.first_year.min, analysis.roi.first_year.max
        ));
        out.push_str(&format!(
            "- Subsequent Years ROI: {}% to {}%\n\n",
            analysis.roi.subsequent_years.min, analysis.roi.subsequent_years.max
        ));
        out.push_str(&format!(
            "Payback Period: {} to {} months\n",
            analysis.payback_period_months.min, analysis.payback_period_months.max
        ));
        out
    }

    pub fn update(&mut self, patch: &Value) -> Result<()> {
        self.data = self.data.merged(patch)?;
        Ok(())
    }
}
