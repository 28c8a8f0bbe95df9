//! API route handlers

use crate::error::ApiError;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use price_forecast::metrics::AccuracyReport;
use price_forecast::{ChartPayload, ForecastChart};
use tracing::info;

/// The two mock price indices
pub async fn get_data(State(state): State<AppState>) -> Result<Json<ChartPayload>, ApiError> {
    let payload = state.service.price_indices()?;
    info!(labels = payload.labels.len(), datasets = payload.datasets.len(), "served price indices");
    Ok(Json(payload))
}

/// The true line with every model's rolling forecasts
pub async fn get_data_forecasts(
    State(state): State<AppState>,
) -> Result<Json<ForecastChart>, ApiError> {
    let chart = state.service.forecast_chart()?;
    info!(labels = chart.labels.len(), models = chart.datasets.len(), "served forecast chart");
    Ok(Json(chart))
}

/// Accuracy of each model's rolling forecasts
pub async fn get_forecast_accuracy(
    State(state): State<AppState>,
) -> Result<Json<AccuracyReport>, ApiError> {
    let report = state.service.forecast_accuracy()?;
    info!(models = report.models.len(), "served forecast accuracy");
    Ok(Json(report))
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
