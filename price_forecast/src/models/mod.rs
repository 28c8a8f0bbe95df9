//! Forecasting models for monthly series
//!
//! Models are used in two stages: [`ForecastModel::train`] fits a history
//! prefix and returns a [`TrainedForecastModel`], which then produces a
//! [`Forecast`] for any horizon. [`ModelSpec`] is the configurable closed
//! set of models the rolling runner works with.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

pub mod arima;
pub mod random_walk;

pub use arima::{ArimaModel, TrainedArimaModel};
pub use random_walk::{RandomWalk, TrainedRandomWalk};

/// Forecast values for consecutive future months
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizon: usize,
}

impl Forecast {
    /// Create a new forecast, checking the value count against the horizon
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::ModelFit(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Forecast contains non-finite values".to_string(),
            ));
        }

        Ok(Self { values, horizon })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<Forecast>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series prefix
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on time series data
    fn train(&self, history: &TimeSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Train on `history` and forecast `horizon` months past its end
    fn forecast(&self, history: &TimeSeries, horizon: usize) -> Result<Forecast> {
        let trained = self.train(history).map_err(|err| {
            debug!(
                model = self.name(),
                observations = history.len(),
                error = %err,
                "training failed"
            );
            err
        })?;
        debug!(model = trained.name(), observations = history.len(), horizon, "trained");
        trained.forecast(horizon)
    }
}

/// Model selection as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Flat line at the mean of the last `lags` observations
    RandomWalk {
        #[serde(default = "default_lags")]
        lags: usize,
    },
    /// ARIMA(p, d, q) fitted by conditional least squares
    Autoregressive { p: usize, d: usize, q: usize },
}

fn default_lags() -> usize {
    1
}

impl ModelSpec {
    /// Fit the configured model on `history` and forecast `horizon` steps
    pub fn forecast(&self, history: &TimeSeries, horizon: usize) -> Result<Forecast> {
        match *self {
            ModelSpec::RandomWalk { lags } => RandomWalk::new(lags)?.forecast(history, horizon),
            ModelSpec::Autoregressive { p, d, q } => {
                ArimaModel::new(p, d, q)?.forecast(history, horizon)
            }
        }
    }

    /// Check the parameters without fitting anything
    pub fn validate(&self) -> Result<()> {
        match *self {
            ModelSpec::RandomWalk { lags } => RandomWalk::new(lags).map(|_| ()),
            ModelSpec::Autoregressive { p, d, q } => ArimaModel::new(p, d, q).map(|_| ()),
        }
    }
}

/// A model together with the label it is charted under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedModel {
    pub label: String,
    pub model: ModelSpec,
}

impl NamedModel {
    pub fn new(label: impl Into<String>, model: ModelSpec) -> Self {
        Self {
            label: label.into(),
            model,
        }
    }

    pub fn forecast(&self, history: &TimeSeries, horizon: usize) -> Result<Forecast> {
        self.model.forecast(history, horizon)
    }
}
