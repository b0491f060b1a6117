use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use fehb_compare::error::AppError;
use fehb_compare::estimator::{
    ComparisonReport, ComparisonRequest, CostComparisonEngine, EligibilityReport,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EligiblePlansQuery {
    #[serde(default)]
    pub(crate) zip: String,
}

pub(crate) fn with_comparison_routes(engine: Arc<CostComparisonEngine>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/plans", get(eligible_plans_endpoint))
        .route("/api/v1/plans/compare", post(compare_endpoint))
        .with_state(engine)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn eligible_plans_endpoint(
    State(engine): State<Arc<CostComparisonEngine>>,
    Query(query): Query<EligiblePlansQuery>,
) -> Json<EligibilityReport> {
    Json(engine.list_eligible(&query.zip))
}

pub(crate) async fn compare_endpoint(
    State(engine): State<Arc<CostComparisonEngine>>,
    payload: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Result<Json<ComparisonReport>, AppError> {
    let Json(request) = payload?;
    Ok(Json(engine.compare(&request)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use fehb_compare::estimator::{
        EstimatorAssumptions, PlanCode, PlanLinks, PlanRecord, UtilizationLevel,
        UtilizationProfile,
    };
    use fehb_compare::tables::{
        BenefitRow, BenefitTable, PlanCatalog, ReferenceTables, ServiceAreaRow, ServiceAreaTable,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn plan(code: &str, network: &str, premium: f64) -> PlanRecord {
        PlanRecord {
            code: PlanCode::new(code),
            carrier_name: Some("Blue Plains".to_string()),
            plan_name: format!("Option {code}"),
            option_type: "Standard".to_string(),
            network_type: network.to_string(),
            annual_premium: premium,
            employer_seed: None,
            government_annual: None,
            links: PlanLinks::default(),
        }
    }

    fn engine() -> Arc<CostComparisonEngine> {
        let plans = PlanCatalog::try_new(vec![
            plan("104", "PPO", 2400.0),
            plan("105", "PPO", 3600.0),
            plan("E31", "HMO", 1800.0),
        ])
        .expect("catalog builds");
        let benefits = BenefitTable::new(vec![BenefitRow {
            code: PlanCode::new("104"),
            primary_care: Some("$25".to_string()),
            specialist: Some("20%".to_string()),
            urgent_care: Some("$50".to_string()),
            generic_rx: Some("$5".to_string()),
            brand_rx: Some("Not covered".to_string()),
            deductible: Some("$350".to_string()),
            out_of_pocket_max: Some("$5,000".to_string()),
        }]);
        let service_area = ServiceAreaTable::new(vec![ServiceAreaRow {
            zip: "20001".to_string(),
            plan_code: "10".to_string(),
        }]);

        Arc::new(CostComparisonEngine::new(
            Arc::new(ReferenceTables {
                plans,
                benefits,
                service_area,
                ..ReferenceTables::default()
            }),
            EstimatorAssumptions::default(),
        ))
    }

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_comparison_routes(engine()).layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn compare_ranks_plans_for_zip() {
        let request = ComparisonRequest {
            zip: "20001".to_string(),
            profile: UtilizationProfile::preset(UtilizationLevel::Moderate),
            network_types: Vec::new(),
        };
        let body = serde_json::to_vec(&request).expect("request serializes");

        let response = app(true)
            .oneshot(
                Request::post("/api/v1/plans/compare")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        let results = report["results"].as_array().expect("results array");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["rank"], 1);
        assert!(report.get("notice").is_none());
        assert!(report["highlights"]["top_choice"].is_object());

        let sourced = results
            .iter()
            .find(|result| result["plan_code"] == "104")
            .expect("plan 104 ranked");
        assert_eq!(sourced["confidence"], "high");
        assert_eq!(sourced["uncovered_categories"][0], "brand_rx");
    }

    #[tokio::test]
    async fn compare_accepts_a_minimal_body() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/plans/compare")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"zip":"99999","network_types":["hmo"]}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["notice"]["kind"], "no_service_area");
        let results = report["results"].as_array().expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["plan_code"], "E31");
        assert_eq!(results[0]["confidence"], "low");
    }

    #[tokio::test]
    async fn compare_rejects_malformed_json() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/plans/compare")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"zip\":"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .starts_with("invalid request"));
    }

    #[tokio::test]
    async fn compare_without_json_content_type_is_rejected_as_json() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/plans/compare")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn compare_coerces_negative_counts_to_zero() {
        let body = json!({
            "zip": "20001",
            "profile": {
                "level": "low",
                "primary_care_visits": -1,
                "specialist_visits": -4,
                "urgent_care_visits": 0,
                "monthly_prescriptions": -2
            }
        });
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/plans/compare")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        let sourced = report["results"]
            .as_array()
            .expect("results array")
            .iter()
            .find(|result| result["plan_code"] == "104")
            .expect("plan 104 ranked");
        assert_eq!(sourced["breakdown"]["primary_care"], 0.0);
        assert_eq!(sourced["breakdown"]["specialist"], 0.0);
        assert_eq!(sourced["breakdown"]["generic_rx"], 0.0);
    }

    #[tokio::test]
    async fn eligible_plans_lists_catalog_entries() {
        let response = app(true)
            .oneshot(
                Request::get("/api/v1/plans?zip=20001")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        let plans = report["plans"].as_array().expect("plans array");
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0]["plan_code"], "104");
        assert_eq!(plans[0]["display_name"], "Blue Plains Option 104");
    }

    #[tokio::test]
    async fn eligible_plans_without_zip_fails_open() {
        let response = app(true)
            .oneshot(Request::get("/api/v1/plans").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let report = body_json(response).await;
        assert_eq!(report["notice"]["kind"], "blank_zip");
        assert_eq!(report["plans"].as_array().expect("plans array").len(), 3);
    }
}
