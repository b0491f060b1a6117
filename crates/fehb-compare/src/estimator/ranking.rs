use super::assumptions::RankingWeights;
use super::cost::OutOfPocketEstimate;
use super::domain::{PlanRecord, TaxShelter, UtilizationProfile};
use super::resolver::ResolvedBenefits;
use super::views::{AddOnCosts, Highlights, PlanHighlight, PlanResult};
use std::cmp::Ordering;
use tracing::warn;

/// Income tax avoided by paying `pre_tax_total` through the sheltered account.
///
/// Never more than the contribution nor the cost it offsets, never negative.
pub fn tax_savings(shelter: &TaxShelter, pre_tax_total: f64) -> f64 {
    let sheltered = shelter.contribution.min(pre_tax_total).max(0.0);
    (shelter.marginal_rate.clamp(0.0, 1.0) * sheltered).max(0.0)
}

pub fn composite_score(
    total: f64,
    out_of_pocket: f64,
    tax_savings: f64,
    weights: &RankingWeights,
) -> f64 {
    total + weights.out_of_pocket * out_of_pocket - weights.tax_savings * tax_savings
}

/// Prices one plan. The total is deliberately not floored at zero.
pub fn assemble_result(
    plan: &PlanRecord,
    resolved: &ResolvedBenefits,
    out_of_pocket: &OutOfPocketEstimate,
    add_ons: AddOnCosts,
    profile: &UtilizationProfile,
    weights: &RankingWeights,
) -> PlanResult {
    let premium = plan.annual_premium;
    let add_ons_total = add_ons.total();
    let pre_tax_total = premium + out_of_pocket.capped + add_ons_total;
    let tax_savings = tax_savings(&profile.tax_shelter, pre_tax_total);
    let employer_seed = plan.employer_seed.unwrap_or(0.0);
    let total = pre_tax_total - tax_savings - employer_seed;

    if total < 0.0 {
        warn!(
            plan = %plan.code,
            total,
            employer_seed,
            tax_savings,
            "estimated total is negative; check seed and contribution inputs"
        );
    }

    let percent_of_income = if profile.annual_income > 0.0 {
        total / profile.annual_income
    } else {
        0.0
    };
    let tier = plan.tier();

    PlanResult {
        rank: 0,
        plan_code: plan.code.clone(),
        display_name: plan.display_name(),
        network_type: plan.network_type.clone(),
        option_type: plan.option_type.clone(),
        tier,
        tier_label: tier.label(),
        premium,
        out_of_pocket: out_of_pocket.capped,
        uncapped_out_of_pocket: out_of_pocket.uncapped,
        cap_applied: out_of_pocket.cap_applied,
        out_of_pocket_max: out_of_pocket.out_of_pocket_max,
        breakdown: out_of_pocket.breakdown.clone(),
        add_ons,
        add_ons_total,
        pre_tax_total,
        tax_savings,
        employer_seed,
        total,
        composite_score: composite_score(total, out_of_pocket.capped, tax_savings, weights),
        percent_of_income,
        confidence: resolved.confidence,
        confidence_label: resolved.confidence.label(),
        defaulted_categories: resolved.defaulted.clone(),
        uncovered_categories: resolved.uncovered(),
        links: plan.links.clone(),
    }
}

/// Ascending total, then composite score, then plan code. Ranks start at 1.
pub fn rank_results(mut results: Vec<PlanResult>) -> Vec<PlanResult> {
    results.sort_by(rank_order);
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index + 1;
    }
    results
}

fn rank_order(left: &PlanResult, right: &PlanResult) -> Ordering {
    left.total
        .total_cmp(&right.total)
        .then_with(|| left.composite_score.total_cmp(&right.composite_score))
        .then_with(|| left.plan_code.cmp(&right.plan_code))
}

/// Each highlight is its own extremum over the ranked set; ties go to the better rank.
pub fn highlights(ranked: &[PlanResult]) -> Highlights {
    Highlights {
        top_choice: best_by(ranked, |candidate, best| rank_order(candidate, best).is_lt())
            .map(|result| PlanHighlight::of(result, result.total)),
        cheapest_premium: best_by(ranked, |candidate, best| candidate.premium < best.premium)
            .map(|result| PlanHighlight::of(result, result.premium)),
        lowest_out_of_pocket: best_by(ranked, |candidate, best| {
            candidate.out_of_pocket < best.out_of_pocket
        })
        .map(|result| PlanHighlight::of(result, result.out_of_pocket)),
        best_tax_benefit: best_by(ranked, |candidate, best| {
            candidate.tax_savings > best.tax_savings
        })
        .map(|result| PlanHighlight::of(result, result.tax_savings)),
    }
}

fn best_by<F>(results: &[PlanResult], better: F) -> Option<&PlanResult>
where
    F: Fn(&PlanResult, &PlanResult) -> bool,
{
    let mut iter = results.iter();
    let mut best = iter.next()?;
    for candidate in iter {
        if better(candidate, best) {
            best = candidate;
        }
    }
    Some(best)
}
