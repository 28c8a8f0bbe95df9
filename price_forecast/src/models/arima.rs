//! ARIMA models for monthly series
//!
//! The series is differenced `d` times and an ARMA(p, q) is fitted to the
//! result by conditional least squares. Pre-sample shocks are taken as zero.
//! Moving average terms follow Hannan–Rissanen: residuals of a long
//! autoregression stand in for the unobserved shocks, then the regression is
//! repeated on recomputed residuals until the coefficients settle or the
//! residual sum of squares stops improving. The best iterate is kept, with its
//! MA part shrunk into the invertible region.
//! Forecasts are expected values (future shocks are zero), integrated back
//! to levels.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{Forecast, ForecastModel, TrainedForecastModel};
use series_math::{difference, least_squares, Integrator};
use tracing::debug;

const MAX_AR_ORDER: usize = 10;
const MAX_DIFFERENCING: usize = 2;
const MAX_MA_ORDER: usize = 10;
/// Upper bound on the absolute sum of fitted MA coefficients
const MAX_MA_SUM: f64 = 0.99;
/// Ridge penalty relative to the regression target energy
const RIDGE_FRACTION: f64 = 1e-8;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Cap on residual refinement rounds when q > 0; the best round so far is kept
    max_iterations: usize,
    /// Relative coefficient change that counts as converged
    tolerance: f64,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    name: String,
    p: usize,
    q: usize,
    /// Constant term, zero whenever d > 0
    intercept: f64,
    /// Fitted AR coefficients, lag 1 first
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients, lag 1 first
    ma_coefficients: Vec<f64>,
    /// History after differencing
    differenced: Vec<f64>,
    /// In-sample shocks on the differenced scale
    residuals: Vec<f64>,
    /// Carries differenced forecasts back to levels
    integrator: Integrator,
}

/// Coefficients in design-matrix order: intercept?, AR lags, MA lags
#[derive(Debug, Clone)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
}

impl Coefficients {
    fn from_solution(solution: &[f64], has_intercept: bool, p: usize) -> Self {
        let offset = usize::from(has_intercept);
        Self {
            intercept: if has_intercept { solution[0] } else { 0.0 },
            ar: solution[offset..offset + p].to_vec(),
            ma: solution[offset + p..].to_vec(),
        }
    }

    fn flat(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.intercept)
            .chain(self.ar.iter().copied())
            .chain(self.ma.iter().copied())
    }

    /// Shrink the MA coefficients until their absolute sum is below one
    ///
    /// An absolute sum under one keeps every root of the MA polynomial
    /// outside the unit circle, so the shock recursion stays bounded.
    fn make_invertible(&mut self) {
        let total: f64 = self.ma.iter().map(|theta| theta.abs()).sum();
        if total >= MAX_MA_SUM {
            let factor = MAX_MA_SUM / total;
            self.ma.iter_mut().for_each(|theta| *theta *= factor);
        }
    }

    /// One-step prediction at `t` from the values and shocks before it
    fn predict(&self, values: &[f64], shocks: &[f64], t: usize) -> f64 {
        let ar: f64 = self
            .ar
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * values[t - 1 - i])
            .sum();
        let ma: f64 = self
            .ma
            .iter()
            .enumerate()
            .map(|(j, theta)| theta * shocks[t - 1 - j])
            .sum();

        self.intercept + ar + ma
    }
}

impl ArimaModel {
    /// Create a new ARIMA(p, d, q) model
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > MAX_AR_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "AR order must be <= {}, got {}",
                MAX_AR_ORDER, p
            )));
        }
        if d > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidParameter(format!(
                "Differencing order must be <= {}, got {}",
                MAX_DIFFERENCING, d
            )));
        }
        if q > MAX_MA_ORDER {
            return Err(ForecastError::InvalidParameter(format!(
                "MA order must be <= {}, got {}",
                MAX_MA_ORDER, q
            )));
        }

        Ok(Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
            max_iterations: 200,
            tolerance: 1e-6,
        })
    }

    /// Override the refinement cap and convergence tolerance
    pub fn with_convergence(mut self, max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 || tolerance.is_nan() || tolerance <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Convergence needs at least one iteration and a positive tolerance".to_string(),
            ));
        }

        self.max_iterations = max_iterations;
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    fn has_intercept(&self) -> bool {
        self.d == 0
    }

    /// First index of the differenced series that gets a regression row
    fn first_row(&self) -> usize {
        self.p.max(self.q)
    }

    /// Regress `values[t]` on an intercept, `p` lagged values and `q` lagged shocks
    ///
    /// A positive `ridge` appends one penalty row per lag column, shrinking
    /// the lag coefficients toward zero.
    fn regress(
        values: &[f64],
        shocks: &[f64],
        p: usize,
        q: usize,
        start: usize,
        intercept: bool,
        ridge: f64,
    ) -> Result<Vec<f64>> {
        let columns = usize::from(intercept) + p + q;
        let rows_available = values.len().saturating_sub(start);
        if rows_available == 0 || rows_available < columns {
            return Err(ForecastError::ModelFit(format!(
                "Too few observations: {} regression rows for {} coefficients",
                rows_available, columns
            )));
        }

        let mut rows: Vec<Vec<f64>> = (start..values.len())
            .map(|t| {
                let mut row = Vec::with_capacity(columns);
                if intercept {
                    row.push(1.0);
                }
                row.extend((1..=p).map(|lag| values[t - lag]));
                row.extend((1..=q).map(|lag| shocks[t - lag]));
                row
            })
            .collect();
        let mut targets = values[start..].to_vec();

        if ridge > 0.0 {
            let weight = ridge.sqrt();
            for column in usize::from(intercept)..columns {
                let mut row = vec![0.0; columns];
                row[column] = weight;
                rows.push(row);
                targets.push(0.0);
            }
        }

        Ok(least_squares(&rows, &targets)?)
    }

    /// Plain least squares, retried with a small ridge penalty when singular
    fn regress_stabilized(
        values: &[f64],
        shocks: &[f64],
        p: usize,
        q: usize,
        start: usize,
        intercept: bool,
    ) -> Result<Vec<f64>> {
        Self::regress(values, shocks, p, q, start, intercept, 0.0).or_else(|err| {
            let energy: f64 = values[start.min(values.len())..].iter().map(|v| v * v).sum();
            let ridge = RIDGE_FRACTION * energy.max(1.0);
            debug!(error = %err, ridge, "retrying regression with a ridge penalty");
            Self::regress(values, shocks, p, q, start, intercept, ridge)
        })
    }

    /// Shocks implied by `coefficients`, zero before `start`
    fn shocks(values: &[f64], coefficients: &Coefficients, start: usize) -> Result<Vec<f64>> {
        let mut shocks = vec![0.0; values.len()];
        for t in start..values.len() {
            shocks[t] = values[t] - coefficients.predict(values, &shocks, t);
        }

        if shocks.iter().any(|e| !e.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Residuals diverged; the moving average part is not invertible".to_string(),
            ));
        }

        Ok(shocks)
    }

    /// Residuals of a long autoregression, the stand-in shocks for the first MA fit
    fn long_ar_shocks(&self, values: &[f64]) -> Result<Vec<f64>> {
        let intercept = self.has_intercept();
        let wanted = (self.p + self.q).max((values.len() as f64).ln().ceil() as usize);
        // leave at least as many rows as coefficients
        let cap = values.len().saturating_sub(usize::from(intercept)) / 2;
        let order = wanted.min(cap);
        if order == 0 {
            return Err(ForecastError::ModelFit(format!(
                "Too few observations ({}) to estimate moving average terms",
                values.len()
            )));
        }

        let solution = Self::regress_stabilized(values, &[], order, 0, order, intercept)?;
        let long_ar = Coefficients::from_solution(&solution, intercept, order);
        Self::shocks(values, &long_ar, order)
    }

    /// One ARMA regression on the given shocks, MA part pulled inside the invertible region
    fn fit_arma(&self, values: &[f64], shocks: &[f64]) -> Result<Coefficients> {
        let intercept = self.has_intercept();
        let solution =
            Self::regress_stabilized(values, shocks, self.p, self.q, self.first_row(), intercept)?;
        let mut coefficients = Coefficients::from_solution(&solution, intercept, self.p);
        coefficients.make_invertible();
        Ok(coefficients)
    }

    fn fit_coefficients(&self, values: &[f64]) -> Result<(Coefficients, Vec<f64>)> {
        let intercept = self.has_intercept();
        let start = self.first_row();

        if self.q == 0 {
            let solution = Self::regress(values, &[], self.p, 0, start, intercept, 0.0)?;
            let coefficients = Coefficients::from_solution(&solution, intercept, self.p);
            let shocks = Self::shocks(values, &coefficients, start)?;
            return Ok((coefficients, shocks));
        }

        let long_shocks = self.long_ar_shocks(values)?;
        let mut current = self.fit_arma(values, &long_shocks)?;
        let mut current_shocks = Self::shocks(values, &current, start)?;

        let mut best = current.clone();
        let mut best_shocks = current_shocks.clone();
        let mut best_rss = sum_of_squares(&current_shocks[start..]);

        for iteration in 1..=self.max_iterations {
            let next = match self.fit_arma(values, &current_shocks) {
                Ok(next) => next,
                Err(err) => {
                    debug!(model = %self.name, iteration, error = %err, "refinement stopped");
                    break;
                }
            };
            let next_shocks = Self::shocks(values, &next, start)?;
            let rss = sum_of_squares(&next_shocks[start..]);

            let change = current
                .flat()
                .zip(next.flat())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            let scale = next.flat().map(f64::abs).fold(1.0, f64::max);
            current = next;
            current_shocks = next_shocks;

            if rss < best_rss {
                best = current.clone();
                best_shocks = current_shocks.clone();
                best_rss = rss;
            } else if rss > best_rss * (1.0 + self.tolerance) {
                debug!(model = %self.name, iteration, rss, best_rss, "residuals stopped improving");
                break;
            }

            if change <= self.tolerance * scale {
                debug!(model = %self.name, iteration, "moving average refinement converged");
                break;
            }
        }

        Ok((best, best_shocks))
    }
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, history: &TimeSeries) -> Result<TrainedArimaModel> {
        if !history.is_contiguous() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} needs a gap-free monthly history; fill missing months first",
                self.name
            )));
        }

        let needed = self.p + self.d + self.q;
        if history.len() < needed || history.is_empty() {
            return Err(ForecastError::ModelFit(format!(
                "Insufficient data for {}. Need at least {} observations, have {}.",
                self.name,
                needed.max(1),
                history.len()
            )));
        }

        let levels = history.values();
        let differenced = difference(levels, self.d)?;
        let integrator = Integrator::new(levels, self.d)?;
        let (coefficients, residuals) = self.fit_coefficients(&differenced)?;

        if coefficients.flat().any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "{} produced non-finite coefficients",
                self.name
            )));
        }

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            p: self.p,
            q: self.q,
            intercept: coefficients.intercept,
            ar_coefficients: coefficients.ar,
            ma_coefficients: coefficients.ma,
            differenced,
            residuals,
            integrator,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// In-sample shocks on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<Forecast> {
        let coefficients = Coefficients {
            intercept: self.intercept,
            ar: self.ar_coefficients.clone(),
            ma: self.ma_coefficients.clone(),
        };

        let mut values = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        let mut integrator = self.integrator.clone();
        let mut levels = Vec::with_capacity(horizon);

        debug_assert!(values.len() > self.p.max(self.q));
        for _ in 0..horizon {
            let t = values.len();
            let next = coefficients.predict(&values, &shocks, t);
            values.push(next);
            shocks.push(0.0);
            levels.push(integrator.next_level(next));
        }

        Forecast::new(levels, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
