//! Configuration of the chart series and the rolling forecasts
//!
//! Defaults reproduce the stock setup: two mock price indices over
//! 2020-01..2021-12 and a mock true line over 2010-01..2026-12 forecast
//! twelve months ahead by a random walk and an AR(2).

use crate::calendar::serde_month;
use crate::error::{ForecastError, Result};
use crate::models::{ModelSpec, NamedModel};
use crate::rolling::FailurePolicy;
use crate::source::{MockSeries, SeriesSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A series shown on a chart under `label`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSource {
    pub label: String,
    pub source: SeriesSource,
}

/// Series drawn by the plain price index chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicesConfig {
    pub series: Vec<LabeledSource>,
}

/// Rolling forecast setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastsConfig {
    pub true_series: LabeledSource,
    pub models: Vec<NamedModel>,
    pub horizon: usize,
    /// First origin to forecast from; defaults to the first date of the series
    #[serde(default, with = "serde_month::option")]
    pub origin_start: Option<NaiveDate>,
    /// Last candidate origin; defaults to the last date of the series
    #[serde(default, with = "serde_month::option")]
    pub origin_end: Option<NaiveDate>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Seed of the generator built for each request
    pub seed: u64,
    pub indices: IndicesConfig,
    pub forecasts: ForecastsConfig,
}

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            indices: IndicesConfig {
                series: vec![
                    LabeledSource {
                        label: "Price Index 1".to_string(),
                        source: SeriesSource::Mock(MockSeries::new(
                            month(2020, 1),
                            month(2021, 12),
                            100.0,
                            10.0,
                        )),
                    },
                    LabeledSource {
                        label: "Price Index 2".to_string(),
                        source: SeriesSource::Mock(MockSeries::new(
                            month(2020, 1),
                            month(2021, 12),
                            200.0,
                            15.0,
                        )),
                    },
                ],
            },
            forecasts: ForecastsConfig {
                true_series: LabeledSource {
                    label: "True Line".to_string(),
                    source: SeriesSource::Mock(MockSeries::new(
                        month(2010, 1),
                        month(2026, 12),
                        100.0,
                        10.0,
                    )),
                },
                models: vec![
                    NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 }),
                    NamedModel::new("ARIMA(2,0,0)", ModelSpec::Autoregressive { p: 2, d: 0, q: 0 }),
                ],
                horizon: 12,
                origin_start: Some(month(2012, 1)),
                origin_end: None,
                failure_policy: FailurePolicy::Abort,
            },
        }
    }
}

impl ForecastConfig {
    /// Load a JSON configuration file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the parts that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.indices.series.is_empty() {
            return Err(ForecastError::Config(
                "At least one price index series is required".to_string(),
            ));
        }

        let forecasts = &self.forecasts;
        if forecasts.horizon == 0 {
            return Err(ForecastError::Config(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        if forecasts.models.is_empty() {
            return Err(ForecastError::Config(
                "At least one forecast model is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for model in &forecasts.models {
            if !seen.insert(model.label.as_str()) {
                return Err(ForecastError::Config(format!(
                    "Duplicate model label '{}'",
                    model.label
                )));
            }
            model
                .model
                .validate()
                .map_err(|e| ForecastError::Config(format!("Model '{}': {}", model.label, e)))?;
        }

        if let (Some(start), Some(end)) = (forecasts.origin_start, forecasts.origin_end) {
            if end < start {
                return Err(ForecastError::Config(format!(
                    "origin_end {} is before origin_start {}",
                    end, start
                )));
            }
        }

        Ok(())
    }
}
