use serde::{Deserialize, Serialize};

/// Fixed model constants behind every estimate. Overridable as a whole from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorAssumptions {
    pub anchors: AnchorCharges,
    pub defaults: BenefitDefaults,
    pub prescriptions: PrescriptionMix,
    pub events: EventCosts,
    /// Share of the deductible assumed to be paid before the year ends.
    pub deductible_exposure: f64,
    pub dental: DentalAssumptions,
    pub ranking: RankingWeights,
}

impl Default for EstimatorAssumptions {
    fn default() -> Self {
        Self {
            anchors: AnchorCharges::default(),
            defaults: BenefitDefaults::default(),
            prescriptions: PrescriptionMix::default(),
            events: EventCosts::default(),
            deductible_exposure: 0.25,
            dental: DentalAssumptions::default(),
            ranking: RankingWeights::default(),
        }
    }
}

/// Assumed allowed charge per service, used to turn a coinsurance rate into dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorCharges {
    pub primary_care: f64,
    pub specialist: f64,
    pub urgent_care: f64,
    pub generic_rx: f64,
    pub brand_rx: f64,
}

impl Default for AnchorCharges {
    fn default() -> Self {
        Self {
            primary_care: 150.0,
            specialist: 250.0,
            urgent_care: 200.0,
            generic_rx: 25.0,
            brand_rx: 150.0,
        }
    }
}

/// Flat values substituted when a plan's own benefit data is missing or unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitDefaults {
    pub primary_care: f64,
    pub specialist: f64,
    pub urgent_care: f64,
    pub generic_rx: f64,
    pub brand_rx: f64,
    pub deductible: f64,
    pub out_of_pocket_max: f64,
}

impl Default for BenefitDefaults {
    fn default() -> Self {
        Self {
            primary_care: 30.0,
            specialist: 50.0,
            urgent_care: 75.0,
            generic_rx: 10.0,
            brand_rx: 50.0,
            deductible: 700.0,
            out_of_pocket_max: 7000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionMix {
    pub generic_share: f64,
    pub brand_share: f64,
    /// Monthly fills assumed generic before any brand fill is counted.
    pub generic_only_fills: u32,
}

impl Default for PrescriptionMix {
    fn default() -> Self {
        Self {
            generic_share: 0.7,
            brand_share: 0.3,
            generic_only_fills: 2,
        }
    }
}

/// Household share of each high-cost event, before the per-event cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCosts {
    pub surgery: f64,
    pub therapy: f64,
    pub maternity: f64,
    /// Maternity never exceeds this fraction of the out-of-pocket maximum.
    pub maternity_cap_fraction: f64,
}

impl Default for EventCosts {
    fn default() -> Self {
        Self {
            surgery: 3000.0,
            therapy: 1500.0,
            maternity: 2500.0,
            maternity_cap_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DentalAssumptions {
    pub unit_cost: f64,
    pub coverage_rate: f64,
    pub annual_max_per_person: f64,
}

impl Default for DentalAssumptions {
    fn default() -> Self {
        Self {
            unit_cost: 1500.0,
            coverage_rate: 0.5,
            annual_max_per_person: 2000.0,
        }
    }
}

/// Weights of the composite score used to separate plans with equal totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub out_of_pocket: f64,
    pub tax_savings: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            out_of_pocket: 0.1,
            tax_savings: 0.05,
        }
    }
}
