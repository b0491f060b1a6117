use super::assumptions::EstimatorAssumptions;
use super::domain::{BenefitParameters, UtilizationProfile};
use serde::Serialize;

/// Per-category household spend, scaled by the utilization multiplier but not capped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutOfPocketBreakdown {
    pub primary_care: f64,
    pub specialist: f64,
    pub urgent_care: f64,
    pub generic_rx: f64,
    pub brand_rx: f64,
    pub surgery: f64,
    pub therapy: f64,
    pub maternity: f64,
    pub deductible_exposure: f64,
}

impl OutOfPocketBreakdown {
    pub fn prescriptions(&self) -> f64 {
        self.generic_rx + self.brand_rx
    }

    pub fn total(&self) -> f64 {
        self.primary_care
            + self.specialist
            + self.urgent_care
            + self.generic_rx
            + self.brand_rx
            + self.surgery
            + self.therapy
            + self.maternity
            + self.deductible_exposure
    }

    fn scaled(self, multiplier: f64) -> Self {
        Self {
            primary_care: self.primary_care * multiplier,
            specialist: self.specialist * multiplier,
            urgent_care: self.urgent_care * multiplier,
            generic_rx: self.generic_rx * multiplier,
            brand_rx: self.brand_rx * multiplier,
            surgery: self.surgery * multiplier,
            therapy: self.therapy * multiplier,
            maternity: self.maternity * multiplier,
            deductible_exposure: self.deductible_exposure * multiplier,
        }
    }
}

/// Medical out-of-pocket estimate for one plan.
///
/// `breakdown` keeps every category uncapped, so its parts can add up to more than
/// `capped` whenever `cap_applied` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfPocketEstimate {
    pub breakdown: OutOfPocketBreakdown,
    pub multiplier: f64,
    pub uncapped: f64,
    pub capped: f64,
    pub cap_applied: bool,
    pub out_of_pocket_max: f64,
}

pub fn estimate_out_of_pocket(
    parameters: &BenefitParameters,
    profile: &UtilizationProfile,
    assumptions: &EstimatorAssumptions,
) -> OutOfPocketEstimate {
    let anchors = &assumptions.anchors;
    let mix = &assumptions.prescriptions;
    let events = &assumptions.events;
    let max = parameters.out_of_pocket_max;

    let monthly_fills = f64::from(profile.monthly_prescriptions);
    let brand_fills = f64::from(
        profile
            .monthly_prescriptions
            .saturating_sub(mix.generic_only_fills),
    );

    let base = OutOfPocketBreakdown {
        primary_care: parameters.primary_care.per_service_cost(anchors.primary_care)
            * f64::from(profile.primary_care_visits),
        specialist: parameters.specialist.per_service_cost(anchors.specialist)
            * f64::from(profile.specialist_visits),
        urgent_care: parameters.urgent_care.per_service_cost(anchors.urgent_care)
            * f64::from(profile.urgent_care_visits),
        generic_rx: parameters.generic_rx.per_service_cost(anchors.generic_rx)
            * monthly_fills
            * 12.0
            * mix.generic_share,
        brand_rx: parameters.brand_rx.per_service_cost(anchors.brand_rx)
            * brand_fills
            * 12.0
            * mix.brand_share,
        surgery: event_cost(profile.events.major_surgery, events.surgery, max),
        therapy: event_cost(profile.events.therapy_program, events.therapy, max),
        maternity: event_cost(
            profile.events.maternity,
            events.maternity,
            max * events.maternity_cap_fraction,
        ),
        deductible_exposure: parameters.deductible * assumptions.deductible_exposure,
    };

    let multiplier = profile.level.multiplier();
    let breakdown = base.scaled(multiplier);
    let uncapped = breakdown.total();
    let capped = uncapped.min(max).max(0.0);

    OutOfPocketEstimate {
        breakdown,
        multiplier,
        uncapped,
        capped,
        cap_applied: uncapped > max,
        out_of_pocket_max: max,
    }
}

fn event_cost(flagged: bool, lump_sum: f64, cap: f64) -> f64 {
    if flagged {
        lump_sum.min(cap)
    } else {
        0.0
    }
}

/// Crown and implant spend, kept outside the medical out-of-pocket cap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DentalMajorWork {
    pub procedure_cost: f64,
    pub plan_coverage: f64,
    pub patient_owed: f64,
}

/// Major dental work is only modelled when the household carries a dental plan.
pub fn dental_major_work(
    profile: &UtilizationProfile,
    assumptions: &EstimatorAssumptions,
) -> DentalMajorWork {
    if !profile.dental.include || profile.dental.major_procedures == 0 {
        return DentalMajorWork::default();
    }

    let dental = &assumptions.dental;
    let procedure_cost = f64::from(profile.dental.major_procedures) * dental.unit_cost;
    let family_max = dental.annual_max_per_person * f64::from(profile.family_size);
    let plan_coverage = (procedure_cost * dental.coverage_rate).min(family_max);

    DentalMajorWork {
        procedure_cost,
        plan_coverage,
        patient_owed: (procedure_cost - plan_coverage).max(0.0),
    }
}
