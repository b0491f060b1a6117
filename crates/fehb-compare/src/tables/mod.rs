//! Reference tables feeding the estimator: plan catalog, benefit rows, service area
//! and dental/vision add-on rates.
//!
//! Tables are loaded from CSV files with a fixed header contract (see [`SCHEMA_VERSION`])
//! and are immutable once built.

mod normalizer;
mod parser;

use crate::estimator::{BenefitCategory, PlanCode, PlanRecord};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub(crate) use normalizer::{normalize_zip, strip_currency};

/// Version of the CSV header contract understood by the loaders.
pub const SCHEMA_VERSION: u32 = 1;

pub const PLANS_FILE: &str = "plans.csv";
pub const BENEFITS_FILE: &str = "benefits.csv";
pub const SERVICE_AREA_FILE: &str = "service_area.csv";
pub const DENTAL_RATES_FILE: &str = "dental_rates.csv";
pub const VISION_RATES_FILE: &str = "vision_rates.csv";

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {table} data: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("plan code {code} appears more than once in the plan catalog")]
    DuplicatePlanCode { code: PlanCode },
}

/// Plan offerings keyed by unique enrollment code, iterated in code order.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: Vec<PlanRecord>,
}

impl PlanCatalog {
    pub fn try_new(mut plans: Vec<PlanRecord>) -> Result<Self, TableLoadError> {
        plans.sort_by(|left, right| left.code.cmp(&right.code));
        if let Some(pair) = plans.windows(2).find(|pair| pair[0].code == pair[1].code) {
            return Err(TableLoadError::DuplicatePlanCode {
                code: pair[0].code.clone(),
            });
        }
        Ok(Self { plans })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableLoadError> {
        let plans = parser::parse_plans(reader).map_err(|source| TableLoadError::Csv {
            table: "plan",
            source,
        })?;
        Self::try_new(plans)
    }

    pub fn plans(&self) -> &[PlanRecord] {
        &self.plans
    }

    pub fn get(&self, code: &PlanCode) -> Option<&PlanRecord> {
        self.plans
            .binary_search_by(|plan| plan.code.cmp(code))
            .ok()
            .map(|index| &self.plans[index])
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Raw benefit cells for one plan, exactly as published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenefitRow {
    pub code: PlanCode,
    pub primary_care: Option<String>,
    pub specialist: Option<String>,
    pub urgent_care: Option<String>,
    pub generic_rx: Option<String>,
    pub brand_rx: Option<String>,
    pub deductible: Option<String>,
    pub out_of_pocket_max: Option<String>,
}

impl BenefitRow {
    pub fn raw(&self, category: BenefitCategory) -> Option<&str> {
        let cell = match category {
            BenefitCategory::PrimaryCare => &self.primary_care,
            BenefitCategory::Specialist => &self.specialist,
            BenefitCategory::UrgentCare => &self.urgent_care,
            BenefitCategory::GenericRx => &self.generic_rx,
            BenefitCategory::BrandRx => &self.brand_rx,
            BenefitCategory::Deductible => &self.deductible,
            BenefitCategory::OutOfPocketMax => &self.out_of_pocket_max,
        };
        cell.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }

    fn populated(&self) -> usize {
        BenefitCategory::ordered()
            .into_iter()
            .filter(|category| self.raw(*category).is_some())
            .count()
    }

    /// Most complete row first, then raw cell text in category order.
    fn selection_key(&self) -> (Reverse<usize>, [Option<&str>; 7]) {
        (
            Reverse(self.populated()),
            BenefitCategory::ordered().map(|category| self.raw(category)),
        )
    }
}

/// One benefit row per plan. When the source holds several rows for a plan the
/// row with the smallest selection key wins, independent of file order.
#[derive(Debug, Clone, Default)]
pub struct BenefitTable {
    rows: BTreeMap<PlanCode, BenefitRow>,
}

impl BenefitTable {
    pub fn new(rows: Vec<BenefitRow>) -> Self {
        let mut grouped: BTreeMap<PlanCode, Vec<BenefitRow>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.code.clone()).or_default().push(row);
        }

        let rows = grouped
            .into_iter()
            .filter_map(|(code, mut candidates)| {
                if candidates.len() > 1 {
                    debug!(
                        plan = %code,
                        rows = candidates.len(),
                        "multiple benefit rows; keeping the most complete"
                    );
                }
                candidates.sort_by(|left, right| left.selection_key().cmp(&right.selection_key()));
                candidates.into_iter().next().map(|row| (code, row))
            })
            .collect();

        Self { rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableLoadError> {
        let rows = parser::parse_benefits(reader).map_err(|source| TableLoadError::Csv {
            table: "benefit",
            source,
        })?;
        Ok(Self::new(rows))
    }

    pub fn get(&self, code: &PlanCode) -> Option<&BenefitRow> {
        self.rows.get(code)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAreaRow {
    pub zip: String,
    pub plan_code: String,
}

/// ZIP code → two-character plan code prefixes serviceable there.
#[derive(Debug, Clone, Default)]
pub struct ServiceAreaTable {
    by_zip: BTreeMap<String, BTreeSet<String>>,
}

impl ServiceAreaTable {
    pub fn new(rows: Vec<ServiceAreaRow>) -> Self {
        let mut by_zip: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for row in rows {
            let zip = normalize_zip(&row.zip);
            let prefix = PlanCode::new(row.plan_code).prefix();
            if zip.is_empty() || prefix.is_empty() {
                continue;
            }
            by_zip.entry(zip).or_default().insert(prefix);
        }
        Self { by_zip }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableLoadError> {
        let rows = parser::parse_service_area(reader).map_err(|source| TableLoadError::Csv {
            table: "service area",
            source,
        })?;
        Ok(Self::new(rows))
    }

    pub fn prefixes_for(&self, zip: &str) -> Option<&BTreeSet<String>> {
        self.by_zip.get(zip)
    }

    pub fn zip_count(&self) -> usize {
        self.by_zip.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddOnRate {
    pub plan: String,
    pub self_and_family_monthly: f64,
}

/// Flat monthly rates for one add-on product line (dental or vision).
#[derive(Debug, Clone, Default)]
pub struct AddOnRateTable {
    rates: Vec<AddOnRate>,
}

impl AddOnRateTable {
    pub fn new(rates: Vec<AddOnRate>) -> Self {
        Self { rates }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableLoadError> {
        let rates = parser::parse_add_on_rates(reader).map_err(|source| TableLoadError::Csv {
            table: "add-on rate",
            source,
        })?;
        Ok(Self::new(rates))
    }

    pub fn rates(&self) -> &[AddOnRate] {
        &self.rates
    }

    /// Mean self-and-family monthly rate, or zero for an empty table.
    pub fn average_monthly(&self) -> f64 {
        if self.rates.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .rates
            .iter()
            .map(|rate| rate.self_and_family_monthly)
            .sum();
        total / self.rates.len() as f64
    }
}

/// Every table the estimator reads, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub plans: PlanCatalog,
    pub benefits: BenefitTable,
    pub service_area: ServiceAreaTable,
    pub dental_rates: AddOnRateTable,
    pub vision_rates: AddOnRateTable,
}

impl ReferenceTables {
    /// Loads the schema files from `dir`. Add-on rate files are optional.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, TableLoadError> {
        let dir = dir.as_ref();

        let plans = PlanCatalog::from_reader(open(dir.join(PLANS_FILE))?)?;
        let benefits = BenefitTable::from_reader(open(dir.join(BENEFITS_FILE))?)?;
        let service_area = ServiceAreaTable::from_reader(open(dir.join(SERVICE_AREA_FILE))?)?;
        let dental_rates = optional_rates(dir.join(DENTAL_RATES_FILE))?;
        let vision_rates = optional_rates(dir.join(VISION_RATES_FILE))?;

        info!(
            schema = SCHEMA_VERSION,
            dir = %dir.display(),
            plans = plans.len(),
            benefit_rows = benefits.len(),
            zips = service_area.zip_count(),
            dental_rates = dental_rates.rates().len(),
            vision_rates = vision_rates.rates().len(),
            "reference tables loaded"
        );

        Ok(Self {
            plans,
            benefits,
            service_area,
            dental_rates,
            vision_rates,
        })
    }
}

fn open(path: PathBuf) -> Result<std::fs::File, TableLoadError> {
    std::fs::File::open(&path).map_err(|source| TableLoadError::Io { path, source })
}

fn optional_rates(path: PathBuf) -> Result<AddOnRateTable, TableLoadError> {
    if !path.exists() {
        debug!(path = %path.display(), "add-on rate file absent; using an empty table");
        return Ok(AddOnRateTable::default());
    }
    AddOnRateTable::from_reader(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::PlanLinks;

    fn plan(code: &str) -> PlanRecord {
        PlanRecord {
            code: PlanCode::new(code),
            carrier_name: None,
            plan_name: format!("Plan {code}"),
            option_type: String::new(),
            network_type: "HMO".to_string(),
            annual_premium: 1200.0,
            employer_seed: None,
            government_annual: None,
            links: PlanLinks::default(),
        }
    }

    fn benefit_row(code: &str, primary_care: Option<&str>, specialist: Option<&str>) -> BenefitRow {
        BenefitRow {
            code: PlanCode::new(code),
            primary_care: primary_care.map(str::to_string),
            specialist: specialist.map(str::to_string),
            ..BenefitRow::default()
        }
    }

    #[test]
    fn catalog_rejects_duplicate_codes() {
        let error = PlanCatalog::try_new(vec![plan("111"), plan("222"), plan("111")])
            .expect_err("duplicate code rejected");
        match error {
            TableLoadError::DuplicatePlanCode { code } => assert_eq!(code, PlanCode::new("111")),
            other => panic!("expected duplicate plan code, got {other:?}"),
        }
    }

    #[test]
    fn catalog_orders_plans_by_code() {
        let catalog = PlanCatalog::try_new(vec![plan("B62"), plan("111"), plan("A11")])
            .expect("catalog builds");
        let codes: Vec<&str> = catalog.plans().iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["111", "A11", "B62"]);
        assert!(catalog.get(&PlanCode::new("a11")).is_some());
        assert!(catalog.get(&PlanCode::new("999")).is_none());
    }

    #[test]
    fn benefit_table_selection_ignores_input_order() {
        let sparse = benefit_row("111", Some("$40"), None);
        let complete = benefit_row("111", Some("$30"), Some("$60"));
        let other_complete = benefit_row("111", Some("$25"), Some("$60"));

        let forward = BenefitTable::new(vec![
            sparse.clone(),
            complete.clone(),
            other_complete.clone(),
        ]);
        let backward = BenefitTable::new(vec![other_complete, complete, sparse]);

        let chosen = forward.get(&PlanCode::new("111")).expect("row present");
        assert_eq!(chosen, backward.get(&PlanCode::new("111")).expect("row present"));
        assert_eq!(chosen.primary_care.as_deref(), Some("$25"));
        assert_eq!(forward.len(), 1);
    }

    #[test]
    fn service_area_groups_prefixes_by_zip() {
        let table = ServiceAreaTable::new(vec![
            ServiceAreaRow {
                zip: " 58104 ".to_string(),
                plan_code: "b6".to_string(),
            },
            ServiceAreaRow {
                zip: "58104".to_string(),
                plan_code: "111".to_string(),
            },
            ServiceAreaRow {
                zip: "".to_string(),
                plan_code: "22".to_string(),
            },
        ]);

        let prefixes = table.prefixes_for("58104").expect("zip present");
        assert!(prefixes.contains("B6"));
        assert!(prefixes.contains("11"));
        assert_eq!(table.zip_count(), 1);
    }

    #[test]
    fn add_on_average_handles_empty_table() {
        assert_eq!(AddOnRateTable::default().average_monthly(), 0.0);
        let table = AddOnRateTable::new(vec![
            AddOnRate {
                plan: "A".to_string(),
                self_and_family_monthly: 40.0,
            },
            AddOnRate {
                plan: "B".to_string(),
                self_and_family_monthly: 60.0,
            },
        ]);
        assert_eq!(table.average_monthly(), 50.0);
    }

    #[test]
    fn from_dir_reports_missing_files_with_path() {
        let error = ReferenceTables::from_dir("./does-not-exist").expect_err("io error expected");
        match error {
            TableLoadError::Io { path, .. } => assert!(path.ends_with(PLANS_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
