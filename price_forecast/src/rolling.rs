//! Rolling-origin forecasting
//!
//! For every origin that leaves room for a full horizon before the end of
//! the series, each configured model is fitted on the history up to and
//! including that origin and asked for `horizon` values.

use crate::calendar;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::NamedModel;
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};

/// What happens when a model fails at some origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first model error fails the whole run
    #[default]
    Abort,
    /// The failing model is reported with its error; other models carry on
    Isolate,
}

/// `origin <= last - (horizon - 1) months`: the horizon fits inside the series
pub fn is_forecastable(origin: NaiveDate, last: NaiveDate, horizon: usize) -> bool {
    let Ok(horizon) = i32::try_from(horizon) else {
        return false;
    };

    match calendar::add_months(last, 1 - horizon) {
        Ok(boundary) => origin <= boundary,
        Err(_) => false,
    }
}

/// Series dates within `[start, end]`; open bounds default to the series bounds
pub fn origins_between(
    series: &TimeSeries,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    series
        .dates()
        .iter()
        .copied()
        .filter(|d| start.map_or(true, |s| *d >= s) && end.map_or(true, |e| *d <= e))
        .collect()
}

/// Forecasts of one model keyed by origin, in the order origins were run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastResult {
    entries: Vec<(NaiveDate, Vec<f64>)>,
}

impl ForecastResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the forecast made at `origin`, replacing an earlier one in place
    pub fn insert(&mut self, origin: NaiveDate, values: Vec<f64>) {
        match self.entries.iter_mut().find(|(o, _)| *o == origin) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((origin, values)),
        }
    }

    pub fn get(&self, origin: NaiveDate) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(o, _)| *o == origin)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn origins(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().map(|(o, _)| *o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[f64])> + '_ {
        self.entries.iter().map(|(o, v)| (*o, v.as_slice()))
    }

    /// Earliest origin, regardless of insertion order
    pub fn first_origin(&self) -> Option<NaiveDate> {
        self.origins().min()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Serialize for ForecastResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (origin, values) in &self.entries {
            map.serialize_entry(&calendar::origin_key(*origin), values)?;
        }
        map.end()
    }
}

/// Rolling forecasts of one labelled model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecasts {
    pub label: String,
    pub forecasts: ForecastResult,
    /// Set when the model failed under [`FailurePolicy::Isolate`]
    pub error: Option<String>,
}

/// All models' rolling forecasts for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCollection {
    horizon: usize,
    models: Vec<ModelForecasts>,
}

impl ForecastCollection {
    pub fn new(horizon: usize, models: Vec<ModelForecasts>) -> Self {
        Self { horizon, models }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn models(&self) -> &[ModelForecasts] {
        &self.models
    }

    pub fn get(&self, label: &str) -> Option<&ModelForecasts> {
        self.models.iter().find(|m| m.label == label)
    }

    /// Earliest origin any model forecast from
    pub fn first_origin(&self) -> Option<NaiveDate> {
        self.models
            .iter()
            .filter_map(|m| m.forecasts.first_origin())
            .min()
    }
}

/// Runs every model at every forecastable origin
#[derive(Debug, Clone)]
pub struct RollingForecastRunner {
    horizon: usize,
    policy: FailurePolicy,
}

impl RollingForecastRunner {
    /// Create a runner producing `horizon` values per origin
    pub fn new(horizon: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            horizon,
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Forecast from each origin in the order given
    pub fn run(
        &self,
        series: &TimeSeries,
        models: &[NamedModel],
        origins: &[NaiveDate],
    ) -> Result<ForecastCollection> {
        let last = series.last_date().ok_or_else(|| {
            ForecastError::DataFormat("Cannot forecast from an empty series".to_string())
        })?;

        if models.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one model is required".to_string(),
            ));
        }

        let mut results: Vec<ModelForecasts> = models
            .iter()
            .map(|m| ModelForecasts {
                label: m.label.clone(),
                forecasts: ForecastResult::new(),
                error: None,
            })
            .collect();

        let mut forecast_count = 0;
        for &origin in origins {
            if !is_forecastable(origin, last, self.horizon) {
                debug!(
                    origin = %origin,
                    last = %last,
                    horizon = self.horizon,
                    "skipping origin without a full horizon"
                );
                continue;
            }
            forecast_count += 1;

            let history = series.through(origin);
            for (model, result) in models.iter().zip(results.iter_mut()) {
                if result.error.is_some() {
                    continue;
                }

                match model.forecast(&history, self.horizon) {
                    Ok(forecast) => result.forecasts.insert(origin, forecast.into_values()),
                    Err(err) => match self.policy {
                        FailurePolicy::Abort => return Err(err),
                        FailurePolicy::Isolate => {
                            warn!(
                                model = %model.label,
                                origin = %origin,
                                error = %err,
                                "model failed; isolating it"
                            );
                            result.forecasts.clear();
                            result.error = Some(err.to_string());
                        }
                    },
                }
            }
        }

        if forecast_count == 0 {
            return Err(ForecastError::NoForecastableOrigins {
                last,
                horizon: self.horizon,
            });
        }

        info!(
            models = models.len(),
            origins = forecast_count,
            skipped = origins.len() - forecast_count,
            horizon = self.horizon,
            "rolling forecasts complete"
        );

        Ok(ForecastCollection::new(self.horizon, results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelSpec;
    use rstest::rstest;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[rstest]
    #[case(ymd(2020, 1), ymd(2020, 12), 12, true)]
    #[case(ymd(2020, 2), ymd(2020, 12), 12, false)]
    #[case(ymd(2020, 12), ymd(2020, 12), 1, true)]
    #[case(ymd(2019, 6), ymd(2020, 12), 12, true)]
    #[case(ymd(2020, 6), ymd(2020, 12), 6, true)]
    #[case(ymd(2020, 8), ymd(2020, 12), 6, false)]
    fn test_is_forecastable(
        #[case] origin: NaiveDate,
        #[case] last: NaiveDate,
        #[case] horizon: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(is_forecastable(origin, last, horizon), expected);
    }

    #[test]
    fn test_forecast_result_keeps_insertion_order() {
        let mut result = ForecastResult::new();
        result.insert(ymd(2020, 3), vec![1.0]);
        result.insert(ymd(2020, 1), vec![2.0]);
        result.insert(ymd(2020, 3), vec![3.0]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(ymd(2020, 3)), Some(&[3.0][..]));
        assert_eq!(result.first_origin(), Some(ymd(2020, 1)));

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"2020-03-01":[3.0],"2020-01-01":[2.0]}"#);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        assert!(matches!(
            RollingForecastRunner::new(0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_isolate_keeps_healthy_models() {
        let series = TimeSeries::monthly(ymd(2020, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let models = vec![
            NamedModel::new("rw", ModelSpec::RandomWalk { lags: 1 }),
            NamedModel::new("wide", ModelSpec::RandomWalk { lags: 3 }),
        ];

        let collection = RollingForecastRunner::new(2)
            .unwrap()
            .with_policy(FailurePolicy::Isolate)
            .run(&series, &models, series.dates())
            .unwrap();

        let rw = collection.get("rw").unwrap();
        assert!(rw.error.is_none());
        assert_eq!(rw.forecasts.len(), 3);

        // three lags cannot be taken at the first origin
        let wide = collection.get("wide").unwrap();
        assert!(wide.error.is_some());
        assert!(wide.forecasts.is_empty());
    }

    #[test]
    fn test_abort_is_the_default_policy() {
        let series = TimeSeries::monthly(ymd(2020, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let models = vec![
            NamedModel::new("rw", ModelSpec::RandomWalk { lags: 1 }),
            NamedModel::new("wide", ModelSpec::RandomWalk { lags: 3 }),
        ];
        let runner = RollingForecastRunner::new(2).unwrap();

        assert_eq!(runner.policy(), FailurePolicy::Abort);
        assert!(matches!(
            runner.run(&series, &models, series.dates()),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
