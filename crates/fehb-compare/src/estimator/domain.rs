use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Dollar figure charged for a service the plan does not cover at all.
pub const NOT_COVERED_SENTINEL: f64 = 9999.0;

/// Enrollment code identifying one plan option (e.g. `"111"` or `"B61"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanCode(pub String);

impl PlanCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_ascii_uppercase())
    }

    /// Two-character carrier prefix used by the service-area join.
    pub fn prefix(&self) -> String {
        self.0.chars().take(2).collect::<String>().to_ascii_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Informational links carried through to the result records untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_of_benefits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formulary: Option<String>,
}

/// One plan offering as loaded from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub code: PlanCode,
    pub carrier_name: Option<String>,
    pub plan_name: String,
    pub option_type: String,
    pub network_type: String,
    /// Employee-paid premium for a full year.
    pub annual_premium: f64,
    pub employer_seed: Option<f64>,
    pub government_annual: Option<f64>,
    pub links: PlanLinks,
}

impl PlanRecord {
    /// Carrier and plan name when a carrier is known, otherwise plan name and option type.
    pub fn display_name(&self) -> String {
        let raw = match self.carrier_name.as_deref().map(str::trim) {
            Some(carrier) if !carrier.is_empty() => format!("{carrier} {}", self.plan_name),
            _ => format!("{} {}", self.plan_name, self.option_type),
        };
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn tier(&self) -> PlanTier {
        PlanTier::infer(&format!("{} {}", self.plan_name, self.option_type))
    }
}

/// Coverage tier inferred from plan naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    HighDeductible,
    Rich,
    Standard,
    Basic,
}

impl PlanTier {
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("hdhp") || name.contains("high deductible") || name.contains("consumer") {
            Self::HighDeductible
        } else if name.contains("high") || name.contains("rich") {
            Self::Rich
        } else if name.contains("standard") {
            Self::Standard
        } else if name.contains("basic") {
            Self::Basic
        } else {
            Self::Standard
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighDeductible => "HDHP",
            Self::Rich => "Rich",
            Self::Standard => "Standard",
            Self::Basic => "Basic",
        }
    }
}

/// The seven benefit parameters resolved for every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCategory {
    PrimaryCare,
    Specialist,
    UrgentCare,
    GenericRx,
    BrandRx,
    Deductible,
    OutOfPocketMax,
}

impl BenefitCategory {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::PrimaryCare,
            Self::Specialist,
            Self::UrgentCare,
            Self::GenericRx,
            Self::BrandRx,
            Self::Deductible,
            Self::OutOfPocketMax,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimaryCare => "Primary Care",
            Self::Specialist => "Specialist",
            Self::UrgentCare => "Urgent Care",
            Self::GenericRx => "Generic Rx",
            Self::BrandRx => "Brand Rx",
            Self::Deductible => "Deductible",
            Self::OutOfPocketMax => "Out-of-Pocket Maximum",
        }
    }
}

/// How a plan shares the cost of a single service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostShare {
    Copay { amount: f64 },
    Coinsurance { rate: f64 },
    NotCovered,
}

impl CostShare {
    pub const fn is_coinsurance(&self) -> bool {
        matches!(self, Self::Coinsurance { .. })
    }

    /// Dollar amount for flat cost sharing; `None` for coinsurance.
    pub fn flat_amount(&self) -> Option<f64> {
        match self {
            Self::Copay { amount } => Some(*amount),
            Self::NotCovered => Some(NOT_COVERED_SENTINEL),
            Self::Coinsurance { .. } => None,
        }
    }

    /// Household cost of one service, converting coinsurance through the anchor charge.
    pub fn per_service_cost(&self, anchor: f64) -> f64 {
        match self {
            Self::Copay { amount } => *amount,
            Self::Coinsurance { rate } => anchor * rate,
            Self::NotCovered => NOT_COVERED_SENTINEL,
        }
    }
}

/// Fully resolved cost-sharing values for one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitParameters {
    pub primary_care: CostShare,
    pub specialist: CostShare,
    pub urgent_care: CostShare,
    pub generic_rx: CostShare,
    pub brand_rx: CostShare,
    pub deductible: f64,
    pub out_of_pocket_max: f64,
}

impl BenefitParameters {
    pub fn cost_share(&self, category: BenefitCategory) -> Option<CostShare> {
        match category {
            BenefitCategory::PrimaryCare => Some(self.primary_care),
            BenefitCategory::Specialist => Some(self.specialist),
            BenefitCategory::UrgentCare => Some(self.urgent_care),
            BenefitCategory::GenericRx => Some(self.generic_rx),
            BenefitCategory::BrandRx => Some(self.brand_rx),
            BenefitCategory::Deductible | BenefitCategory::OutOfPocketMax => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
        }
    }
}

/// Overall intensity of care use, scaling the variable cost estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl UtilizationLevel {
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Low => 0.6,
            Self::Moderate => 1.0,
            Self::High => 1.5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    /// Typical annual visit and monthly prescription counts for the level.
    pub const fn preset(self) -> UtilizationPreset {
        match self {
            Self::Low => UtilizationPreset {
                primary_care_visits: 2,
                specialist_visits: 4,
                urgent_care_visits: 1,
                monthly_prescriptions: 1,
            },
            Self::Moderate => UtilizationPreset {
                primary_care_visits: 6,
                specialist_visits: 12,
                urgent_care_visits: 2,
                monthly_prescriptions: 10,
            },
            Self::High => UtilizationPreset {
                primary_care_visits: 10,
                specialist_visits: 24,
                urgent_care_visits: 4,
                monthly_prescriptions: 20,
            },
        }
    }
}

impl std::str::FromStr for UtilizationLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" | "medium" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            other => Err(format!("unknown utilization level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilizationPreset {
    pub primary_care_visits: u32,
    pub specialist_visits: u32,
    pub urgent_care_visits: u32,
    pub monthly_prescriptions: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighCostEvents {
    pub major_surgery: bool,
    pub therapy_program: bool,
    pub maternity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DentalSelection {
    pub include: bool,
    /// Falls back to the average loaded dental rate when absent.
    pub monthly_premium: Option<f64>,
    /// Crowns or implants expected this year.
    #[serde(deserialize_with = "lenient_count")]
    pub major_procedures: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSelection {
    pub include: bool,
    pub monthly_premium: Option<f64>,
}

/// Pre-tax account (HSA/FSA) contribution and the rate it shelters income at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxShelter {
    pub contribution: f64,
    pub marginal_rate: f64,
}

/// Household inputs driving every estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilizationProfile {
    #[serde(deserialize_with = "lenient_count")]
    pub family_size: u32,
    pub annual_income: f64,
    pub level: UtilizationLevel,
    #[serde(deserialize_with = "lenient_count")]
    pub monthly_prescriptions: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub primary_care_visits: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub specialist_visits: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub urgent_care_visits: u32,
    pub events: HighCostEvents,
    pub dental: DentalSelection,
    pub vision: VisionSelection,
    pub tax_shelter: TaxShelter,
}

impl Default for UtilizationProfile {
    fn default() -> Self {
        Self::preset(UtilizationLevel::Moderate)
    }
}

impl UtilizationProfile {
    pub fn preset(level: UtilizationLevel) -> Self {
        let preset = level.preset();
        Self {
            family_size: 1,
            annual_income: 0.0,
            level,
            monthly_prescriptions: preset.monthly_prescriptions,
            primary_care_visits: preset.primary_care_visits,
            specialist_visits: preset.specialist_visits,
            urgent_care_visits: preset.urgent_care_visits,
            events: HighCostEvents::default(),
            dental: DentalSelection::default(),
            vision: VisionSelection::default(),
            tax_shelter: TaxShelter::default(),
        }
    }

    /// Copy with every amount coerced to a finite non-negative value and rates kept in `[0, 1]`.
    pub fn sanitized(&self) -> Self {
        let mut profile = self.clone();
        profile.annual_income = non_negative(profile.annual_income);
        profile.dental.monthly_premium = profile.dental.monthly_premium.map(non_negative);
        profile.vision.monthly_premium = profile.vision.monthly_premium.map(non_negative);
        profile.tax_shelter.contribution = non_negative(profile.tax_shelter.contribution);
        profile.tax_shelter.marginal_rate =
            non_negative(profile.tax_shelter.marginal_rate).min(1.0);
        profile
    }
}

/// Accepts any JSON number for a count. Negative or non-finite values read as 0,
/// fractions are truncated.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(non_negative(value).floor().min(f64::from(u32::MAX)) as u32)
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
