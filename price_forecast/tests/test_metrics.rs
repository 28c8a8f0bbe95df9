use approx::assert_relative_eq;
use chrono::NaiveDate;
use price_forecast::metrics::{evaluate_rolling, forecast_accuracy};
use price_forecast::models::{ModelSpec, NamedModel};
use price_forecast::rolling::{FailurePolicy, RollingForecastRunner};
use price_forecast::TimeSeries;

fn ymd(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn counting_series() -> TimeSeries {
    TimeSeries::monthly(ymd(2020, 1), (1..=12).map(f64::from).collect()).unwrap()
}

#[test]
fn test_regression_metrics() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

    let accuracy = forecast_accuracy(&predicted, &actual).unwrap();
    assert_relative_eq!(accuracy.mae, 2.4, epsilon = 1e-9);
    assert_relative_eq!(accuracy.mse, 6.0, epsilon = 1e-9);
    assert_relative_eq!(accuracy.rmse, 2.449, epsilon = 1e-3);
}

#[test]
fn test_evaluate_rolling_random_walk() {
    let series = counting_series();
    let models = vec![NamedModel::new(
        "Random Walk",
        ModelSpec::RandomWalk { lags: 1 },
    )];

    let collection = RollingForecastRunner::new(2)
        .unwrap()
        .run(&series, &models, &[ymd(2020, 10), ymd(2020, 11)])
        .unwrap();
    let report = evaluate_rolling(&series, &collection).unwrap();

    assert_eq!(report.horizon, 2);
    let model = &report.models[0];
    assert_eq!(model.label, "Random Walk");
    // the second step from 2020-11 lands past the end of the series
    assert_eq!(model.points, 3);

    let metrics = model.metrics.as_ref().unwrap();
    assert_relative_eq!(metrics.mae, 4.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.mse, 2.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.bias, 4.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn test_evaluate_rolling_reports_isolated_failure() {
    let series = counting_series();
    let models = vec![
        NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 }),
        NamedModel::new("Long Walk", ModelSpec::RandomWalk { lags: 11 }),
    ];

    let collection = RollingForecastRunner::new(1)
        .unwrap()
        .with_policy(FailurePolicy::Isolate)
        .run(&series, &models, &[ymd(2020, 2), ymd(2020, 3)])
        .unwrap();
    let report = evaluate_rolling(&series, &collection).unwrap();

    assert_eq!(report.models[0].points, 2);
    assert!(report.models[0].error.is_none());

    let failed = &report.models[1];
    assert_eq!(failed.points, 0);
    assert!(failed.metrics.is_none());
    assert!(failed.error.is_some());
}

#[test]
fn test_report_serializes_without_empty_fields() {
    let series = counting_series();
    let models = vec![NamedModel::new("RW", ModelSpec::RandomWalk { lags: 1 })];
    let collection = RollingForecastRunner::new(1)
        .unwrap()
        .run(&series, &models, &[ymd(2020, 6)])
        .unwrap();

    let json = serde_json::to_value(evaluate_rolling(&series, &collection).unwrap()).unwrap();
    let model = &json["models"][0];
    assert_eq!(model["points"], 1);
    assert!(model.get("error").is_none());
    assert!(model["metrics"]["mae"].is_number());
}
