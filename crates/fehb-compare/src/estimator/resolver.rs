use super::assumptions::BenefitDefaults;
use super::domain::{BenefitCategory, BenefitParameters, Confidence, CostShare, PlanCode};
use crate::tables::{strip_currency, BenefitTable};
use serde::Serialize;
use tracing::{debug, warn};

/// Benefit parameters for one plan together with the trail of substituted defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBenefits {
    pub parameters: BenefitParameters,
    pub confidence: Confidence,
    pub defaulted: Vec<BenefitCategory>,
}

impl ResolvedBenefits {
    pub fn used_only_defaults(&self) -> bool {
        self.defaulted.len() == BenefitCategory::ordered().len()
    }

    pub fn uncovered(&self) -> Vec<BenefitCategory> {
        BenefitCategory::ordered()
            .into_iter()
            .filter(|category| {
                self.parameters.cost_share(*category) == Some(CostShare::NotCovered)
            })
            .collect()
    }
}

/// Parses a published cost-sharing cell.
///
/// `"Not covered"` is checked before the `"no"` prefix so that it is not read as a
/// zero copay.
pub fn parse_cost_share(raw: &str) -> Option<CostShare> {
    let cleaned = strip_currency(raw);
    if cleaned.is_empty() {
        return None;
    }

    let lowered = cleaned.to_lowercase();
    if lowered.contains("not covered") {
        return Some(CostShare::NotCovered);
    }
    if lowered.starts_with("no") {
        return Some(CostShare::Copay { amount: 0.0 });
    }
    if let Some(percent) = cleaned.strip_suffix('%') {
        return parse_amount(percent).map(|percent| CostShare::Coinsurance {
            rate: percent / 100.0,
        });
    }

    parse_amount(&cleaned).map(|amount| CostShare::Copay { amount })
}

/// Deductibles and out-of-pocket maximums only accept flat dollar amounts.
pub fn parse_dollar_limit(raw: &str) -> Option<f64> {
    match parse_cost_share(raw)? {
        CostShare::Copay { amount } => Some(amount),
        CostShare::Coinsurance { .. } | CostShare::NotCovered => None,
    }
}

fn parse_amount(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

pub fn resolve_benefits(
    code: &PlanCode,
    table: &BenefitTable,
    defaults: &BenefitDefaults,
) -> ResolvedBenefits {
    let row = table.get(code);
    if row.is_none() {
        debug!(plan = %code, "no benefit row; every category uses its default");
    }

    let mut defaulted = Vec::new();
    let mut share = |category: BenefitCategory, fallback: f64| -> CostShare {
        match row.and_then(|row| row.raw(category)).and_then(parse_cost_share) {
            Some(value) => value,
            None => {
                defaulted.push(category);
                CostShare::Copay { amount: fallback }
            }
        }
    };

    let primary_care = share(BenefitCategory::PrimaryCare, defaults.primary_care);
    let specialist = share(BenefitCategory::Specialist, defaults.specialist);
    let urgent_care = share(BenefitCategory::UrgentCare, defaults.urgent_care);
    let generic_rx = share(BenefitCategory::GenericRx, defaults.generic_rx);
    let brand_rx = share(BenefitCategory::BrandRx, defaults.brand_rx);

    let mut limit = |category: BenefitCategory, fallback: f64| -> f64 {
        match row.and_then(|row| row.raw(category)).and_then(parse_dollar_limit) {
            Some(value) => value,
            None => {
                defaulted.push(category);
                fallback
            }
        }
    };

    let deductible = limit(BenefitCategory::Deductible, defaults.deductible);
    let out_of_pocket_max = limit(BenefitCategory::OutOfPocketMax, defaults.out_of_pocket_max);

    let confidence = if defaulted.is_empty() {
        Confidence::High
    } else {
        Confidence::Low
    };

    if row.is_some() && !defaulted.is_empty() {
        let categories: Vec<&str> = defaulted.iter().map(|category| category.label()).collect();
        warn!(
            plan = %code,
            categories = %categories.join(", "),
            "unreadable benefit cells replaced with defaults"
        );
    }

    ResolvedBenefits {
        parameters: BenefitParameters {
            primary_care,
            specialist,
            urgent_care,
            generic_rx,
            brand_rx,
            deductible,
            out_of_pocket_max,
        },
        confidence,
        defaulted,
    }
}
