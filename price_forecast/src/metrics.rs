//! Metrics for evaluating rolling forecasts against what was observed

use crate::calendar;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::rolling::ForecastCollection;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, zero actuals skipped
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Mean of actual minus forecast
    pub bias: f64,
    /// Sample standard deviation of the errors, absent below two points
    pub error_std_dev: Option<f64>,
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(&errors)
        .filter(|(&a, _)| a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&a, &e)| {
            (sum + e.abs() / a.abs() * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        0.0
    };

    let smape = actual
        .iter()
        .zip(forecast)
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    let error_std_dev = if errors.len() > 1 {
        Some(errors.iter().std_dev())
    } else {
        None
    };

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
        bias: errors.iter().mean(),
        error_std_dev,
    })
}

/// Accuracy of one model over all its origins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAccuracy {
    pub label: String,
    /// Forecast steps that had an observed value to compare with
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ForecastAccuracy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rolling-origin evaluation of every model in a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub horizon: usize,
    pub models: Vec<ModelAccuracy>,
}

/// Compare every forecast step with the value observed that month
///
/// Steps that fall past the end of the series are left out.
pub fn evaluate_rolling(
    series: &TimeSeries,
    collection: &ForecastCollection,
) -> Result<AccuracyReport> {
    let mut models = Vec::with_capacity(collection.models().len());

    for model in collection.models() {
        let mut forecast = Vec::new();
        let mut actual = Vec::new();

        for (origin, values) in model.forecasts.iter() {
            for (step, value) in values.iter().enumerate() {
                let target = calendar::add_months(origin, step as i32 + 1)?;
                if let Some(observed) = series.value_at(target) {
                    forecast.push(*value);
                    actual.push(observed);
                }
            }
        }

        let metrics = if forecast.is_empty() {
            None
        } else {
            Some(forecast_accuracy(&forecast, &actual)?)
        };

        models.push(ModelAccuracy {
            label: model.label.clone(),
            points: forecast.len(),
            metrics,
            error: model.error.clone(),
        });
    }

    Ok(AccuracyReport {
        horizon: collection.horizon(),
        models,
    })
}
