use fehb_compare::config::DataConfig;
use fehb_compare::error::AppError;
use fehb_compare::estimator::CostComparisonEngine;
use fehb_compare::tables::ReferenceTables;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reads the reference tables and assumption overrides once; the engine is shared after this.
pub(crate) fn load_engine(data: &DataConfig) -> Result<CostComparisonEngine, AppError> {
    let assumptions = data.load_assumptions()?;
    let tables = ReferenceTables::from_dir(&data.dir)?;

    info!(
        dir = %data.dir.display(),
        assumptions = data
            .assumptions
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_string()),
        "comparison engine initialised"
    );

    Ok(CostComparisonEngine::new(Arc::new(tables), assumptions))
}
