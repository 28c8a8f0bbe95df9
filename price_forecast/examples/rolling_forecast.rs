//! Rolling forecasts over a mock series, printed as the chart would see them
//!
//! Run with `cargo run -p price_forecast --example rolling_forecast [seed]`.

use chrono::NaiveDate;
use price_forecast::metrics::evaluate_rolling;
use price_forecast::models::{ModelSpec, NamedModel};
use price_forecast::rolling::{FailurePolicy, RollingForecastRunner};
use price_forecast::source::{seeded_rng, MockSeries};
use price_forecast::ResponseFormatter;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);

    let start = NaiveDate::from_ymd_opt(2015, 1, 1).ok_or("bad start date")?;
    let end = NaiveDate::from_ymd_opt(2020, 12, 1).ok_or("bad end date")?;
    let series = MockSeries::new(start, end, 100.0, 10.0).generate(&mut seeded_rng(seed))?;
    println!("Generated {} monthly observations (seed {})", series.len(), seed);

    let models = vec![
        NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 }),
        NamedModel::new("Mean of 3", ModelSpec::RandomWalk { lags: 3 }),
        NamedModel::new("ARIMA(2,0,0)", ModelSpec::Autoregressive { p: 2, d: 0, q: 0 }),
        NamedModel::new("ARIMA(1,1,1)", ModelSpec::Autoregressive { p: 1, d: 1, q: 1 }),
    ];

    let runner = RollingForecastRunner::new(12)?.with_policy(FailurePolicy::Isolate);
    let collection = runner.run(&series, &models, &series.dates()[24..])?;

    let chart = ResponseFormatter::forecast_chart(&series, "True Line", &collection)?;
    println!(
        "Chart spans {} to {}",
        chart.labels.first().map(String::as_str).unwrap_or("-"),
        chart.labels.last().map(String::as_str).unwrap_or("-")
    );

    let report = evaluate_rolling(&series, &collection)?;
    println!("\n{:<14} {:>7} {:>9} {:>9}", "model", "points", "MAE", "RMSE");
    for model in &report.models {
        match (&model.metrics, &model.error) {
            (Some(m), _) => println!(
                "{:<14} {:>7} {:>9.3} {:>9.3}",
                model.label, model.points, m.mae, m.rmse
            ),
            (None, Some(err)) => println!("{:<14} failed: {}", model.label, err),
            (None, None) => println!("{:<14} no overlapping observations", model.label),
        }
    }

    Ok(())
}
