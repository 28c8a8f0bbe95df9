use chrono::NaiveDate;
use price_forecast::config::{ForecastConfig, LabeledSource};
use price_forecast::models::{ModelSpec, NamedModel};
use price_forecast::rolling::RollingForecastRunner;
use price_forecast::source::{seeded_rng, FileSeries, MockSeries, SeriesSource};
use price_forecast::{ChartService, ForecastError, ResponseFormatter};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn ymd(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

// Two years of monthly observations ending 2020-12
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "date\tvalue").unwrap();
    for i in 0..24 {
        let date = ymd(2019 + i / 12, (i % 12 + 1) as u32);
        let value = 100.0 + (i % 5) as f64 - 2.0;
        writeln!(file, "{}\t{}", date.format("%Y-%m-%d"), value).unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load the true series from disk
    let data_file = create_sample_data();
    let series = SeriesSource::File(FileSeries::new(data_file.path()))
        .load(&mut seeded_rng(0))
        .unwrap();
    assert_eq!(series.len(), 24);
    assert_eq!(series.last_date(), Some(ymd(2020, 12)));

    // 2. Forecast twelve months from two candidate origins
    let models = vec![
        NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 }),
        NamedModel::new("AR(1)", ModelSpec::Autoregressive { p: 1, d: 0, q: 0 }),
    ];
    let collection = RollingForecastRunner::new(12)
        .unwrap()
        .run(&series, &models, &[ymd(2020, 1), ymd(2020, 2)])
        .unwrap();

    // 3. Only 2020-01 leaves room for a full horizon
    for model in collection.models() {
        let origins: Vec<NaiveDate> = model.forecasts.origins().collect();
        assert_eq!(origins, vec![ymd(2020, 1)]);
        assert_eq!(model.forecasts.get(ymd(2020, 1)).unwrap().len(), 12);
    }

    // 4. Shape the chart payload
    let chart = ResponseFormatter::forecast_chart(&series, "True Line", &collection).unwrap();
    assert_eq!(chart.labels.len(), 12);
    assert_eq!(chart.labels[0], "2020-01");
    assert_eq!(chart.true_line.data.len(), chart.labels.len());
    assert_eq!(chart.true_line.data[0], series.value_at(ymd(2020, 1)).unwrap());

    let json = serde_json::to_value(&chart).unwrap();
    let walk = &json["datasets"][0];
    assert_eq!(walk["label"], "Random Walk");
    let keys: Vec<&String> = walk["data"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["2020-01-01"]);
    assert_eq!(walk["data"]["2020-01-01"].as_array().unwrap().len(), 13);

    // 5. A missing file surfaces as an IO error
    let missing = SeriesSource::File(FileSeries::new("/nonexistent/path.tsv"));
    assert!(matches!(
        missing.load(&mut seeded_rng(0)),
        Err(ForecastError::Io(_))
    ));
}

#[test]
fn test_forecast_lines_join_the_true_line() {
    let series = MockSeries::new(ymd(2015, 1), ymd(2019, 12), 100.0, 10.0)
        .generate(&mut seeded_rng(3))
        .unwrap();
    let models = vec![NamedModel::new("Random Walk", ModelSpec::RandomWalk { lags: 1 })];
    let origins = &series.dates()[12..];

    let collection = RollingForecastRunner::new(6)
        .unwrap()
        .run(&series, &models, origins)
        .unwrap();
    let chart = ResponseFormatter::forecast_chart(&series, "True Line", &collection).unwrap();

    let data = &chart.datasets[0].data;
    // 2016-01 through 2019-07 are forecastable with a six month horizon
    assert_eq!(data.len(), 43);
    for (origin, line) in data.iter() {
        let observed = series.value_at(origin).unwrap();
        assert_eq!(line.len(), 7);
        assert_eq!(line[0], observed);
        assert!(line[1..].iter().all(|&v| v == observed));
    }
}

#[test]
fn test_price_indices_with_default_config() {
    let service = ChartService::new(ForecastConfig::default()).unwrap();
    let payload = service.price_indices().unwrap();

    assert_eq!(payload.labels.len(), 24);
    assert_eq!(payload.labels.first().unwrap(), "2020-01");
    assert_eq!(payload.labels.last().unwrap(), "2021-12");
    assert_eq!(payload.datasets.len(), 2);
    assert_eq!(payload.datasets[0].label, "Price Index 1");
    assert_eq!(payload.datasets[1].label, "Price Index 2");
    assert!(payload.datasets.iter().all(|d| d.data.len() == 24));
}

#[test]
fn test_same_seed_same_payload() {
    let first = ChartService::new(ForecastConfig::default()).unwrap();
    let second = ChartService::new(ForecastConfig::default()).unwrap();

    assert_eq!(first.price_indices().unwrap(), second.price_indices().unwrap());
    assert_eq!(first.forecast_chart().unwrap(), second.forecast_chart().unwrap());
}

#[test]
fn test_default_forecast_chart_shape() {
    let service = ChartService::new(ForecastConfig::default()).unwrap();
    let chart = service.forecast_chart().unwrap();

    assert_eq!(chart.true_line.label, "True Line");
    assert_eq!(chart.labels.first().unwrap(), "2012-01");
    assert_eq!(chart.labels.last().unwrap(), "2026-12");
    assert_eq!(chart.labels.len(), chart.true_line.data.len());

    let labels: Vec<&str> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Random Walk", "ARIMA(2,0,0)"]);
    for dataset in &chart.datasets {
        // 2012-01 through 2026-01
        assert_eq!(dataset.data.len(), 169);
        assert!(dataset.data.iter().all(|(_, line)| line.len() == 13));
    }
}

#[test]
fn test_no_forecastable_origins() {
    let mut config = ForecastConfig::default();
    config.forecasts.true_series = LabeledSource {
        label: "True Line".to_string(),
        source: SeriesSource::Mock(MockSeries::new(ymd(2020, 1), ymd(2020, 6), 100.0, 10.0)),
    };
    config.forecasts.origin_start = None;

    let service = ChartService::new(config).unwrap();
    assert!(matches!(
        service.forecast_chart(),
        Err(ForecastError::NoForecastableOrigins { horizon: 12, .. })
    ));
}

#[test]
fn test_accuracy_report_for_default_models() {
    let service = ChartService::new(ForecastConfig::default()).unwrap();
    let report = service.forecast_accuracy().unwrap();

    assert_eq!(report.horizon, 12);
    assert_eq!(report.models.len(), 2);
    for model in &report.models {
        // the last step from 2026-01 lands past the end of the series
        assert_eq!(model.points, 169 * 12 - 1);
        let metrics = model.metrics.as_ref().unwrap();
        assert!(metrics.rmse > 0.0);
    }
}
