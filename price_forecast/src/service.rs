//! Request-level assembly of chart payloads
//!
//! Each call builds its own generator from the configured seed, loads the
//! series it needs and discards everything once the payload is returned.

use crate::chart::{ChartPayload, ForecastChart, ResponseFormatter};
use crate::config::ForecastConfig;
use crate::data::TimeSeries;
use crate::error::Result;
use crate::metrics::{evaluate_rolling, AccuracyReport};
use crate::rolling::{origins_between, ForecastCollection, RollingForecastRunner};
use crate::source::seeded_rng;
use tracing::debug;

/// Produces the payloads behind each chart endpoint
#[derive(Debug, Clone)]
pub struct ChartService {
    config: ForecastConfig,
}

impl ChartService {
    /// Create a service over a validated configuration
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// The plain price index chart
    ///
    /// All series are drawn from one generator in declaration order.
    pub fn price_indices(&self) -> Result<ChartPayload> {
        let mut rng = seeded_rng(self.config.seed);
        let series = self
            .config
            .indices
            .series
            .iter()
            .map(|s| Ok((s.label.clone(), s.source.load(&mut rng)?)))
            .collect::<Result<Vec<_>>>()?;

        ChartPayload::from_series(&series)
    }

    /// The true line with every model's rolling forecasts
    pub fn forecast_chart(&self) -> Result<ForecastChart> {
        let (series, collection) = self.rolling_forecasts()?;
        ResponseFormatter::forecast_chart(
            &series,
            &self.config.forecasts.true_series.label,
            &collection,
        )
    }

    /// How far each model's rolling forecasts were from the true line
    pub fn forecast_accuracy(&self) -> Result<AccuracyReport> {
        let (series, collection) = self.rolling_forecasts()?;
        evaluate_rolling(&series, &collection)
    }

    fn rolling_forecasts(&self) -> Result<(TimeSeries, ForecastCollection)> {
        let forecasts = &self.config.forecasts;
        let mut rng = seeded_rng(self.config.seed);
        let series = forecasts.true_series.source.load(&mut rng)?;

        let origins = origins_between(&series, forecasts.origin_start, forecasts.origin_end);
        debug!(
            observations = series.len(),
            candidates = origins.len(),
            "running rolling forecasts"
        );

        let collection = RollingForecastRunner::new(forecasts.horizon)?
            .with_policy(forecasts.failure_policy)
            .run(&series, &forecasts.models, &origins)?;

        Ok((series, collection))
    }
}
