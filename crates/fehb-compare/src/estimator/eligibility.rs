use super::domain::PlanRecord;
use crate::tables::{normalize_zip, PlanCatalog, ServiceAreaTable};
use serde::Serialize;
use tracing::warn;

/// Why the eligibility filter fell back to the full plan set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityNotice {
    BlankZip,
    NoServiceArea { zip: String },
}

impl EligibilityNotice {
    pub fn message(&self) -> String {
        match self {
            Self::BlankZip => "no ZIP code given; showing every plan".to_string(),
            Self::NoServiceArea { zip } => {
                format!("no service-area rows for ZIP {zip}; showing every plan")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EligibilityOutcome<'a> {
    pub plans: Vec<&'a PlanRecord>,
    pub notice: Option<EligibilityNotice>,
}

/// Plans whose enrollment-code prefix is serviceable at `zip`.
///
/// Fails open: a blank or unknown ZIP returns the whole catalog with a notice.
pub fn eligible_plans<'a>(
    zip: &str,
    catalog: &'a PlanCatalog,
    service_area: &ServiceAreaTable,
) -> EligibilityOutcome<'a> {
    let zip = normalize_zip(zip);
    if zip.is_empty() {
        return fail_open(catalog, EligibilityNotice::BlankZip);
    }

    let Some(prefixes) = service_area.prefixes_for(&zip) else {
        return fail_open(catalog, EligibilityNotice::NoServiceArea { zip });
    };

    let plans = catalog
        .plans()
        .iter()
        .filter(|plan| prefixes.contains(&plan.code.prefix()))
        .collect();

    EligibilityOutcome {
        plans,
        notice: None,
    }
}

fn fail_open(catalog: &PlanCatalog, notice: EligibilityNotice) -> EligibilityOutcome<'_> {
    warn!(notice = %notice.message(), plans = catalog.len(), "eligibility filter failed open");
    EligibilityOutcome {
        plans: catalog.plans().iter().collect(),
        notice: Some(notice),
    }
}
