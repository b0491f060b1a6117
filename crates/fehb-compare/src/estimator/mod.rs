//! Annual cost estimation across FEHB plan offerings.
//!
//! Control flow for one comparison: eligibility filter → benefit resolution →
//! out-of-pocket estimate → pricing and ranking. Every step is a pure function over
//! the shared [`ReferenceTables`].

mod assumptions;
mod cost;
mod domain;
mod eligibility;
mod ranking;
mod resolver;
pub mod views;

pub use assumptions::{
    AnchorCharges, BenefitDefaults, DentalAssumptions, EstimatorAssumptions, EventCosts,
    PrescriptionMix, RankingWeights,
};
pub use cost::{
    dental_major_work, estimate_out_of_pocket, DentalMajorWork, OutOfPocketBreakdown,
    OutOfPocketEstimate,
};
pub use domain::{
    BenefitCategory, BenefitParameters, Confidence, CostShare, DentalSelection, HighCostEvents,
    PlanCode, PlanLinks, PlanRecord, PlanTier, TaxShelter, UtilizationLevel, UtilizationPreset,
    UtilizationProfile, VisionSelection, NOT_COVERED_SENTINEL,
};
pub use eligibility::{eligible_plans, EligibilityNotice, EligibilityOutcome};
pub use ranking::{assemble_result, composite_score, highlights, rank_results, tax_savings};
pub use resolver::{parse_cost_share, parse_dollar_limit, resolve_benefits, ResolvedBenefits};
pub use views::{
    AddOnCosts, ComparisonReport, EligibilityReport, EligiblePlan, Highlights, PlanHighlight,
    PlanResult,
};

use crate::tables::ReferenceTables;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Household inputs plus the optional network-type restriction for one comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub profile: UtilizationProfile,
    /// Network types to keep (case-insensitive); empty keeps every network.
    #[serde(default)]
    pub network_types: Vec<String>,
}

/// Stateless estimator bound to one immutable set of reference tables.
#[derive(Debug, Clone)]
pub struct CostComparisonEngine {
    tables: Arc<ReferenceTables>,
    assumptions: EstimatorAssumptions,
}

impl CostComparisonEngine {
    pub fn new(tables: Arc<ReferenceTables>, assumptions: EstimatorAssumptions) -> Self {
        Self {
            tables,
            assumptions,
        }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn assumptions(&self) -> &EstimatorAssumptions {
        &self.assumptions
    }

    pub fn eligible(&self, zip: &str) -> EligibilityOutcome<'_> {
        eligible_plans(zip, &self.tables.plans, &self.tables.service_area)
    }

    /// Serviceable plans for `zip`, listed in plan-code order.
    pub fn list_eligible(&self, zip: &str) -> EligibilityReport {
        let outcome = self.eligible(zip);
        EligibilityReport {
            zip: zip.trim().to_string(),
            notice_message: outcome.notice.as_ref().map(EligibilityNotice::message),
            notice: outcome.notice,
            plans: outcome.plans.into_iter().map(EligiblePlan::from).collect(),
        }
    }

    pub fn compare(&self, request: &ComparisonRequest) -> ComparisonReport {
        let profile = request.profile.sanitized();
        let eligibility = self.eligible(&request.zip);
        let eligible_count = eligibility.plans.len();
        let add_on_premiums = self.add_on_premiums(&profile);

        let results = eligibility
            .plans
            .iter()
            .filter(|plan| network_selected(&plan.network_type, &request.network_types))
            .map(|plan| self.estimate_plan(plan, &profile, &add_on_premiums))
            .collect();
        let results = rank_results(results);
        let highlights = highlights(&results);

        info!(
            zip = %request.zip.trim(),
            level = profile.level.label(),
            eligible = eligible_count,
            ranked = results.len(),
            fail_open = eligibility.notice.is_some(),
            top = highlights
                .top_choice
                .as_ref()
                .map(|top| top.plan_code.as_str())
                .unwrap_or("-"),
            "plan comparison complete"
        );

        ComparisonReport {
            zip: request.zip.trim().to_string(),
            notice_message: eligibility.notice.as_ref().map(EligibilityNotice::message),
            notice: eligibility.notice,
            eligible_plans: eligible_count,
            results,
            highlights,
        }
    }

    /// Estimates a single plan; `profile` is expected to be sanitized already.
    pub fn estimate_plan(
        &self,
        plan: &PlanRecord,
        profile: &UtilizationProfile,
        add_on_premiums: &AddOnCosts,
    ) -> PlanResult {
        let resolved = resolve_benefits(
            &plan.code,
            &self.tables.benefits,
            &self.assumptions.defaults,
        );
        let out_of_pocket =
            estimate_out_of_pocket(&resolved.parameters, profile, &self.assumptions);
        let add_ons = AddOnCosts {
            dental_major_work: dental_major_work(profile, &self.assumptions),
            ..add_on_premiums.clone()
        };

        debug!(
            plan = %plan.code,
            confidence = resolved.confidence.label(),
            uncapped = out_of_pocket.uncapped,
            capped = out_of_pocket.capped,
            "plan estimated"
        );

        assemble_result(
            plan,
            &resolved,
            &out_of_pocket,
            add_ons,
            profile,
            &self.assumptions.ranking,
        )
    }

    /// Annual dental and vision premiums, falling back to the loaded table average.
    pub fn add_on_premiums(&self, profile: &UtilizationProfile) -> AddOnCosts {
        let annual = |include: bool, monthly: Option<f64>, fallback: f64| {
            if include {
                monthly.unwrap_or(fallback) * 12.0
            } else {
                0.0
            }
        };

        AddOnCosts {
            dental_premium: annual(
                profile.dental.include,
                profile.dental.monthly_premium,
                self.tables.dental_rates.average_monthly(),
            ),
            vision_premium: annual(
                profile.vision.include,
                profile.vision.monthly_premium,
                self.tables.vision_rates.average_monthly(),
            ),
            dental_major_work: DentalMajorWork::default(),
        }
    }
}

fn network_selected(network_type: &str, selected: &[String]) -> bool {
    selected.is_empty()
        || selected
            .iter()
            .any(|wanted| wanted.trim().eq_ignore_ascii_case(network_type.trim()))
}
