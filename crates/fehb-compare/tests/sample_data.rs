use fehb_compare::estimator::{
    BenefitCategory, ComparisonRequest, Confidence, CostComparisonEngine, EligibilityNotice,
    EstimatorAssumptions, PlanCode, PlanResult, PlanTier, UtilizationLevel, UtilizationProfile,
};
use fehb_compare::tables::{PlanCatalog, ReferenceTables, TableLoadError};
use std::path::PathBuf;
use std::sync::Arc;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn engine() -> CostComparisonEngine {
    let tables = ReferenceTables::from_dir(data_dir()).expect("sample tables load");
    CostComparisonEngine::new(Arc::new(tables), EstimatorAssumptions::default())
}

fn request(zip: &str, profile: UtilizationProfile) -> ComparisonRequest {
    ComparisonRequest {
        zip: zip.to_string(),
        profile,
        network_types: Vec::new(),
    }
}

fn find<'a>(results: &'a [PlanResult], code: &str) -> &'a PlanResult {
    results
        .iter()
        .find(|result| result.plan_code == PlanCode::new(code))
        .unwrap_or_else(|| panic!("plan {code} missing from results"))
}

#[test]
fn sample_tables_load_completely() {
    let tables = ReferenceTables::from_dir(data_dir()).expect("sample tables load");

    assert_eq!(tables.plans.len(), 7);
    assert_eq!(tables.benefits.len(), 6);
    assert_eq!(tables.service_area.zip_count(), 4);
    assert_eq!(tables.dental_rates.rates().len(), 3);
    assert_eq!(tables.vision_rates.rates().len(), 2);

    let standard = tables
        .plans
        .get(&PlanCode::new("104"))
        .expect("standard option present");
    assert!((standard.annual_premium - 3136.8).abs() < 1e-6);
    assert_eq!(
        standard.display_name(),
        "Blue Cross and Blue Shield Service Benefit Plan Standard Option"
    );

    let value_plan = tables.plans.get(&PlanCode::new("F51")).expect("value plan");
    assert!(value_plan.links.carrier.is_none());
}

#[test]
fn missing_data_dir_reports_the_path() {
    let err = ReferenceTables::from_dir(data_dir().join("does-not-exist"))
        .expect_err("directory is missing");

    assert!(matches!(err, TableLoadError::Io { .. }));
    assert!(err.to_string().contains("plans.csv"));
}

#[test]
fn duplicate_plan_codes_are_rejected() {
    let csv = include_str!("../../../data/plans.csv");
    let duplicated = format!("{csv}{}", csv.lines().nth(1).expect("first plan row"));

    let err = PlanCatalog::from_reader(duplicated.as_bytes()).expect_err("duplicate rejected");
    assert!(matches!(err, TableLoadError::DuplicatePlanCode { .. }));
}

#[test]
fn moderate_household_standard_option_estimate() {
    let report = engine().compare(&request(
        "58104",
        UtilizationProfile::preset(UtilizationLevel::Moderate),
    ));

    let standard = find(&report.results, "104");
    // 180 primary + 480 specialist + 60 urgent + 630 generic + 1296 brand + 87.50 deductible
    assert!((standard.out_of_pocket - 2733.5).abs() < 1e-6);
    assert!(!standard.cap_applied);
    assert_eq!(standard.confidence, Confidence::High);
    assert!((standard.total - (standard.premium + 2733.5)).abs() < 1e-6);
}

#[test]
fn zip_narrows_plans_by_code_prefix() {
    let report = engine().compare(&request("94612", UtilizationProfile::default()));

    assert!(report.notice.is_none());
    let mut codes: Vec<&str> = report
        .results
        .iter()
        .map(|result| result.plan_code.as_str())
        .collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["104", "111", "341", "E31", "JN1"]);
}

#[test]
fn unknown_zip_returns_every_plan_with_notice() {
    let report = engine().compare(&request("00000", UtilizationProfile::default()));

    assert_eq!(report.results.len(), 7);
    assert_eq!(
        report.notice,
        Some(EligibilityNotice::NoServiceArea {
            zip: "00000".to_string()
        })
    );
}

#[test]
fn plan_without_benefit_row_is_estimated_from_defaults() {
    let report = engine().compare(&request("20001", UtilizationProfile::default()));

    let value_plan = find(&report.results, "F51");
    assert_eq!(value_plan.confidence, Confidence::Low);
    assert_eq!(value_plan.defaulted_categories, BenefitCategory::ordered().to_vec());
    assert_eq!(value_plan.out_of_pocket_max, 7000.0);
}

#[test]
fn not_covered_benefit_is_flagged_and_capped() {
    let report = engine().compare(&request("94612", UtilizationProfile::default()));

    let kaiser_basic = find(&report.results, "E31");
    assert_eq!(kaiser_basic.uncovered_categories, vec![BenefitCategory::BrandRx]);
    assert!(kaiser_basic.cap_applied);
    assert_eq!(kaiser_basic.out_of_pocket, 7500.0);
    assert!(kaiser_basic.breakdown.brand_rx > kaiser_basic.out_of_pocket);
}

#[test]
fn employer_seed_and_tax_shelter_lower_the_total() {
    let mut profile = UtilizationProfile::preset(UtilizationLevel::Low);
    profile.tax_shelter.contribution = 1500.0;
    profile.tax_shelter.marginal_rate = 0.24;
    let report = engine().compare(&request("20001", profile));

    let hdhp = find(&report.results, "341");
    assert_eq!(hdhp.tier, PlanTier::HighDeductible);
    assert_eq!(hdhp.employer_seed, 1200.0);
    assert!((hdhp.tax_savings - 360.0).abs() < 1e-9);
    assert!(
        (hdhp.total - (hdhp.pre_tax_total - hdhp.tax_savings - hdhp.employer_seed)).abs() < 1e-9
    );
}

#[test]
fn add_ons_default_to_loaded_rate_averages() {
    let mut profile = UtilizationProfile::default();
    profile.dental.include = true;
    profile.vision.include = true;
    let report = engine().compare(&request("10001", profile));

    for result in &report.results {
        // dental (88.40 + 61.20 + 45.00) / 3 and vision (24.10 + 18.50) / 2, annualized
        assert!((result.add_ons.dental_premium - 778.4).abs() < 1e-6);
        assert!((result.add_ons.vision_premium - 255.6).abs() < 1e-6);
    }
}

#[test]
fn results_are_ranked_by_total_and_highlighted() {
    let report = engine().compare(&request("20001", UtilizationProfile::default()));

    for (index, pair) in report.results.windows(2).enumerate() {
        assert_eq!(pair[0].rank, index + 1);
        assert!(pair[0].total <= pair[1].total);
    }

    let top = report.highlights.top_choice.as_ref().expect("top choice");
    assert_eq!(top.plan_code, report.results[0].plan_code);

    let cheapest = report
        .results
        .iter()
        .map(|result| result.premium)
        .fold(f64::INFINITY, f64::min);
    let highlighted = report
        .highlights
        .cheapest_premium
        .as_ref()
        .expect("cheapest premium");
    assert_eq!(highlighted.value, cheapest);
}

#[test]
fn network_filter_keeps_only_requested_networks() {
    let report = engine().compare(&ComparisonRequest {
        zip: "94612".to_string(),
        profile: UtilizationProfile::default(),
        network_types: vec!["hmo".to_string()],
    });

    assert_eq!(report.eligible_plans, 5);
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|result| result.network_type == "HMO"));
}

#[test]
fn identical_requests_serialize_identically() {
    let engine = engine();
    let mut profile = UtilizationProfile::preset(UtilizationLevel::High);
    profile.events.maternity = true;
    profile.dental.include = true;
    profile.dental.major_procedures = 2;
    profile.tax_shelter.contribution = 3000.0;
    profile.tax_shelter.marginal_rate = 0.22;
    let request = request("20001", profile);

    let first = serde_json::to_string(&engine.compare(&request)).expect("report serializes");
    let second = serde_json::to_string(&engine.compare(&request)).expect("report serializes");
    assert_eq!(first, second);
}
