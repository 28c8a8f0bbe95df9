//! Chart payloads consumed by the front end
//!
//! [`ChartPayload`] is the plain `{labels, datasets}` line chart.
//! [`ForecastChart`] adds the observed `true_line` and one dataset per model
//! whose data maps each origin to `[observed at origin, forecast...]`.

use crate::calendar;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::rolling::{ForecastCollection, ForecastResult};
use serde::Serialize;

/// One line of a plain chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// `{labels, datasets}` with one value per label in every dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartPayload {
    /// Chart several series sharing one date index
    pub fn from_series(series: &[(String, TimeSeries)]) -> Result<Self> {
        let Some((_, first)) = series.first() else {
            return Err(ForecastError::Format(
                "A chart needs at least one series".to_string(),
            ));
        };

        if let Some((label, _)) = series.iter().find(|(_, s)| s.dates() != first.dates()) {
            return Err(ForecastError::Format(format!(
                "Series '{}' does not share the chart's date index",
                label
            )));
        }

        Ok(Self {
            labels: first.labels(),
            datasets: series
                .iter()
                .map(|(label, s)| Dataset {
                    label: label.clone(),
                    data: s.values().to_vec(),
                })
                .collect(),
        })
    }
}

/// The observed series drawn under the forecasts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrueLine {
    pub data: Vec<f64>,
    pub label: String,
}

/// Forecasts of one model keyed by origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDataset {
    pub label: String,
    pub data: ForecastResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `{labels, true_line, datasets}` for the rolling forecast chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastChart {
    pub labels: Vec<String>,
    pub true_line: TrueLine,
    pub datasets: Vec<ForecastDataset>,
}

/// Builds [`ForecastChart`] payloads
#[derive(Debug, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Assemble the forecast chart
    ///
    /// Labels and the true line start at the earliest origin any model
    /// forecast from. Every forecast gets the observed value at its origin
    /// prepended so the plotted line joins the history.
    pub fn forecast_chart(
        series: &TimeSeries,
        label: &str,
        collection: &ForecastCollection,
    ) -> Result<ForecastChart> {
        let offset = match collection.first_origin() {
            Some(origin) => series.position(origin).ok_or_else(|| {
                ForecastError::Format(format!(
                    "First origin {} is not a date of the series",
                    calendar::origin_key(origin)
                ))
            })?,
            None => 0,
        };

        let shown = series.skip(offset);
        let mut datasets = Vec::with_capacity(collection.models().len());

        for model in collection.models() {
            let mut data = ForecastResult::new();
            for (origin, values) in model.forecasts.iter() {
                let idx = shown.position(origin).ok_or_else(|| {
                    ForecastError::Format(format!(
                        "Origin {} of '{}' has no matching label",
                        calendar::origin_key(origin),
                        model.label
                    ))
                })?;

                let mut line = Vec::with_capacity(values.len() + 1);
                line.push(shown.values()[idx]);
                line.extend_from_slice(values);
                data.insert(origin, line);
            }

            datasets.push(ForecastDataset {
                label: model.label.clone(),
                data,
                error: model.error.clone(),
            });
        }

        Ok(ForecastChart {
            labels: shown.labels(),
            true_line: TrueLine {
                data: shown.values().to_vec(),
                label: label.to_string(),
            },
            datasets,
        })
    }
}
