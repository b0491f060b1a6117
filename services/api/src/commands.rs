use crate::infra::load_engine;
use clap::Args;
use fehb_compare::config::AppConfig;
use fehb_compare::error::AppError;
use fehb_compare::estimator::{ComparisonRequest, UtilizationLevel, UtilizationProfile};
use fehb_compare::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DataArgs {
    /// Directory holding plans.csv, benefits.csv and service_area.csv (overrides FEHB_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// JSON file overriding estimator assumptions (overrides FEHB_ASSUMPTIONS)
    #[arg(long)]
    pub(crate) assumptions: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Household ZIP code; blank lists every plan
    #[arg(long, default_value = "")]
    pub(crate) zip: String,
    #[command(flatten)]
    pub(crate) data: DataArgs,
    /// Overall utilization level (low, moderate, high)
    #[arg(long, default_value = "moderate")]
    pub(crate) level: UtilizationLevel,
    #[arg(long, default_value_t = 1)]
    pub(crate) family_size: u32,
    /// Annual household income, used for the percent-of-income figure
    #[arg(long, default_value_t = 0.0)]
    pub(crate) income: f64,
    /// Primary care visits per year (defaults to the level preset)
    #[arg(long)]
    pub(crate) primary_care_visits: Option<u32>,
    /// Specialist visits per year (defaults to the level preset)
    #[arg(long)]
    pub(crate) specialist_visits: Option<u32>,
    /// Urgent care visits per year (defaults to the level preset)
    #[arg(long)]
    pub(crate) urgent_care_visits: Option<u32>,
    /// Prescriptions filled per month (defaults to the level preset)
    #[arg(long)]
    pub(crate) prescriptions: Option<u32>,
    /// Expect a major surgery this year
    #[arg(long)]
    pub(crate) surgery: bool,
    /// Expect a therapy program this year
    #[arg(long)]
    pub(crate) therapy: bool,
    /// Expect a birth this year
    #[arg(long)]
    pub(crate) maternity: bool,
    /// Add a dental plan
    #[arg(long)]
    pub(crate) dental: bool,
    /// Monthly dental premium; defaults to the loaded dental rate average
    #[arg(long)]
    pub(crate) dental_premium: Option<f64>,
    /// Crowns or implants expected this year
    #[arg(long, default_value_t = 0)]
    pub(crate) major_dental: u32,
    /// Add a vision plan
    #[arg(long)]
    pub(crate) vision: bool,
    /// Monthly vision premium; defaults to the loaded vision rate average
    #[arg(long)]
    pub(crate) vision_premium: Option<f64>,
    /// Annual HSA/FSA contribution
    #[arg(long, default_value_t = 0.0)]
    pub(crate) contribution: f64,
    /// Marginal income tax rate applied to the contribution (0.0 - 1.0)
    #[arg(long, default_value_t = 0.0)]
    pub(crate) marginal_rate: f64,
    /// Keep only plans with this network type; repeatable
    #[arg(long = "network")]
    pub(crate) network_types: Vec<String>,
}

impl CompareArgs {
    pub(crate) fn request(&self) -> ComparisonRequest {
        let mut profile = UtilizationProfile::preset(self.level);
        profile.family_size = self.family_size;
        profile.annual_income = self.income;
        if let Some(visits) = self.primary_care_visits {
            profile.primary_care_visits = visits;
        }
        if let Some(visits) = self.specialist_visits {
            profile.specialist_visits = visits;
        }
        if let Some(visits) = self.urgent_care_visits {
            profile.urgent_care_visits = visits;
        }
        if let Some(fills) = self.prescriptions {
            profile.monthly_prescriptions = fills;
        }
        profile.events.major_surgery = self.surgery;
        profile.events.therapy_program = self.therapy;
        profile.events.maternity = self.maternity;
        profile.dental.include = self.dental;
        profile.dental.monthly_premium = self.dental_premium;
        profile.dental.major_procedures = self.major_dental;
        profile.vision.include = self.vision;
        profile.vision.monthly_premium = self.vision_premium;
        profile.tax_shelter.contribution = self.contribution;
        profile.tax_shelter.marginal_rate = self.marginal_rate;

        ComparisonRequest {
            zip: self.zip.clone(),
            profile,
            network_types: self.network_types.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct PlansArgs {
    /// Household ZIP code
    #[arg(long, default_value = "")]
    pub(crate) zip: String,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = command_config(&args.data)?;
    let engine = load_engine(&config.data)?;

    let report = engine.compare(&args.request());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_plans(args: PlansArgs) -> Result<(), AppError> {
    let config = command_config(&args.data)?;
    let engine = load_engine(&config.data)?;

    let report = engine.list_eligible(&args.zip);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn command_config(data: &DataArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = &data.data_dir {
        config.data.dir = dir.clone();
    }
    if let Some(path) = &data.assumptions {
        config.data.assumptions = Some(path.clone());
    }

    telemetry::init(&config.telemetry)?;
    Ok(config)
}
