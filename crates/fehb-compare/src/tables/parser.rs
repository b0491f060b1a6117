use super::normalizer::{collapse_whitespace, non_blank, parse_money};
use super::{AddOnRate, BenefitRow, ServiceAreaRow};
use crate::estimator::{PlanCode, PlanLinks, PlanRecord};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(source)
}

pub(crate) fn parse_plans<R: Read>(source: R) -> Result<Vec<PlanRecord>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut plans = Vec::new();

    for record in csv_reader.deserialize::<PlanRow>() {
        let row = record?;
        plans.push(row.into_record());
    }

    Ok(plans)
}

pub(crate) fn parse_benefits<R: Read>(source: R) -> Result<Vec<BenefitRow>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<BenefitCsvRow>() {
        let row = record?;
        rows.push(BenefitRow {
            code: PlanCode::new(row.enrollment_code),
            primary_care: row.primary_care,
            specialist: row.specialist,
            urgent_care: row.urgent_care,
            generic_rx: row.generic_rx,
            brand_rx: row.brand_rx,
            deductible: row.deductible,
            out_of_pocket_max: row.out_of_pocket_max,
        });
    }

    Ok(rows)
}

pub(crate) fn parse_service_area<R: Read>(source: R) -> Result<Vec<ServiceAreaRow>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<ServiceAreaCsvRow>() {
        let row = record?;
        rows.push(ServiceAreaRow {
            zip: row.zip,
            plan_code: row.plan_code,
        });
    }

    Ok(rows)
}

pub(crate) fn parse_add_on_rates<R: Read>(source: R) -> Result<Vec<AddOnRate>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut rates = Vec::new();

    for record in csv_reader.deserialize::<AddOnCsvRow>() {
        let row = record?;
        // Rows without a readable rate carry no pricing signal.
        if let Some(monthly) = row
            .self_and_family_monthly
            .as_deref()
            .and_then(parse_money)
        {
            rates.push(AddOnRate {
                plan: collapse_whitespace(&row.plan),
                self_and_family_monthly: monthly,
            });
        }
    }

    Ok(rates)
}

#[derive(Debug, Deserialize)]
struct PlanRow {
    enrollment_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    carrier_name: Option<String>,
    plan_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    option_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    network_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employee_monthly: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    government_monthly: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employer_seed: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    carrier_url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sbc_url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    provider_directory_url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    formulary_url: Option<String>,
}

impl PlanRow {
    fn into_record(self) -> PlanRecord {
        let code = PlanCode::new(self.enrollment_code);
        let employee_monthly = self.employee_monthly.as_deref().and_then(parse_money);
        if employee_monthly.is_none() {
            warn!(plan = %code, "plan row has no readable employee premium; using 0");
        }

        PlanRecord {
            carrier_name: non_blank(self.carrier_name),
            plan_name: collapse_whitespace(&self.plan_name),
            option_type: non_blank(self.option_type).unwrap_or_default(),
            network_type: non_blank(self.network_type).unwrap_or_default(),
            annual_premium: employee_monthly.unwrap_or(0.0) * 12.0,
            employer_seed: self.employer_seed.as_deref().and_then(parse_money),
            government_annual: self
                .government_monthly
                .as_deref()
                .and_then(parse_money)
                .map(|monthly| monthly * 12.0),
            links: PlanLinks {
                carrier: http_link(self.carrier_url),
                summary_of_benefits: http_link(self.sbc_url),
                provider_directory: http_link(self.provider_directory_url),
                formulary: http_link(self.formulary_url),
            },
            code,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BenefitCsvRow {
    enrollment_code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    primary_care: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    specialist: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    urgent_care: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    generic_rx: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    brand_rx: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    deductible: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    out_of_pocket_max: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceAreaCsvRow {
    zip: String,
    plan_code: String,
}

#[derive(Debug, Deserialize)]
struct AddOnCsvRow {
    plan: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    self_and_family_monthly: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn http_link(value: Option<String>) -> Option<String> {
    value.filter(|url| url.starts_with("http"))
}
