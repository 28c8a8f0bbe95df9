//! Random walk baseline

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{Forecast, ForecastModel, TrainedForecastModel};

/// Random walk forecast: the mean of the last `lags` observations, held flat
#[derive(Debug, Clone)]
pub struct RandomWalk {
    /// Name of the model
    name: String,
    /// Number of trailing observations averaged
    lags: usize,
}

/// Trained random walk
#[derive(Debug, Clone)]
pub struct TrainedRandomWalk {
    name: String,
    /// Level every forecast step repeats
    level: f64,
}

impl RandomWalk {
    /// Create a new random walk averaging the last `lags` observations
    pub fn new(lags: usize) -> Result<Self> {
        if lags < 1 {
            return Err(ForecastError::InvalidParameter(
                "Random walk lags must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Random Walk (lags={})", lags),
            lags,
        })
    }

    pub fn lags(&self) -> usize {
        self.lags
    }
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            name: "Random Walk (lags=1)".to_string(),
            lags: 1,
        }
    }
}

impl ForecastModel for RandomWalk {
    type Trained = TrainedRandomWalk;

    fn train(&self, history: &TimeSeries) -> Result<TrainedRandomWalk> {
        let values = history.values();
        if values.len() < self.lags {
            return Err(ForecastError::InvalidParameter(format!(
                "Random walk with {} lags needs at least {} observations, have {}",
                self.lags,
                self.lags,
                values.len()
            )));
        }

        let level = series_math::mean(&values[values.len() - self.lags..])?;

        Ok(TrainedRandomWalk {
            name: self.name.clone(),
            level,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedRandomWalk {
    fn forecast(&self, horizon: usize) -> Result<Forecast> {
        Forecast::new(vec![self.level; horizon], horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
