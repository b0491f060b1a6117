use super::cost::{DentalMajorWork, OutOfPocketBreakdown};
use super::domain::{BenefitCategory, Confidence, PlanCode, PlanLinks, PlanRecord, PlanTier};
use super::eligibility::EligibilityNotice;
use serde::Serialize;

/// Dental and vision spend billed on top of the medical plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddOnCosts {
    pub dental_premium: f64,
    pub vision_premium: f64,
    pub dental_major_work: DentalMajorWork,
}

impl AddOnCosts {
    pub fn total(&self) -> f64 {
        self.dental_premium + self.vision_premium + self.dental_major_work.patient_owed
    }
}

/// One row of the comparison output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub rank: usize,
    pub plan_code: PlanCode,
    pub display_name: String,
    pub network_type: String,
    pub option_type: String,
    pub tier: PlanTier,
    pub tier_label: &'static str,
    pub premium: f64,
    pub out_of_pocket: f64,
    pub uncapped_out_of_pocket: f64,
    pub cap_applied: bool,
    pub out_of_pocket_max: f64,
    pub breakdown: OutOfPocketBreakdown,
    pub add_ons: AddOnCosts,
    pub add_ons_total: f64,
    pub pre_tax_total: f64,
    pub tax_savings: f64,
    pub employer_seed: f64,
    pub total: f64,
    pub composite_score: f64,
    pub percent_of_income: f64,
    pub confidence: Confidence,
    pub confidence_label: &'static str,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted_categories: Vec<BenefitCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncovered_categories: Vec<BenefitCategory>,
    pub links: PlanLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanHighlight {
    pub plan_code: PlanCode,
    pub display_name: String,
    pub value: f64,
}

impl PlanHighlight {
    pub(crate) fn of(result: &PlanResult, value: f64) -> Self {
        Self {
            plan_code: result.plan_code.clone(),
            display_name: result.display_name.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Highlights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_choice: Option<PlanHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheapest_premium: Option<PlanHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_out_of_pocket: Option<PlanHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_tax_benefit: Option<PlanHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<EligibilityNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_message: Option<String>,
    pub eligible_plans: usize,
    pub results: Vec<PlanResult>,
    pub highlights: Highlights,
}

/// Catalog entry as listed for a ZIP, without any cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligiblePlan {
    pub plan_code: PlanCode,
    pub display_name: String,
    pub network_type: String,
    pub option_type: String,
    pub tier: PlanTier,
    pub annual_premium: f64,
    pub links: PlanLinks,
}

impl From<&PlanRecord> for EligiblePlan {
    fn from(plan: &PlanRecord) -> Self {
        Self {
            plan_code: plan.code.clone(),
            display_name: plan.display_name(),
            network_type: plan.network_type.clone(),
            option_type: plan.option_type.clone(),
            tier: plan.tier(),
            annual_premium: plan.annual_premium,
            links: plan.links.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<EligibilityNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_message: Option<String>,
    pub plans: Vec<EligiblePlan>,
}
