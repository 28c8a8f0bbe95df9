use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use forecast_server::{app, AppState};
use pretty_assertions::assert_eq;
use price_forecast::calendar::parse_month;
use price_forecast::config::LabeledSource;
use price_forecast::source::{FileSeries, MockSeries, SeriesSource};
use price_forecast::{ChartService, ForecastConfig, ModelSpec, NamedModel};
use serde_json::Value;
use tower::ServiceExt;

fn default_app() -> Router {
    app(AppState::new(
        ChartService::new(ForecastConfig::default()).unwrap(),
    ))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> Value {
    let (status, body) = get(router, uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_data() {
    let json = get_json(default_app(), "/get-data").await;

    let labels = json["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 24);
    assert_eq!(labels[0], "2020-01");

    let datasets = json["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    for dataset in datasets {
        assert_eq!(dataset["data"].as_array().unwrap().len(), 24);
    }
}

#[tokio::test]
async fn test_get_data_is_repeatable() {
    let first = get_json(default_app(), "/get-data").await;
    let second = get_json(default_app(), "/get-data").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_data_forecasts() {
    let json = get_json(default_app(), "/get-data-forecasts").await;

    let labels = json["labels"].as_array().unwrap();
    assert_eq!(json["true_line"]["label"], "True Line");
    assert_eq!(json["true_line"]["data"].as_array().unwrap().len(), labels.len());

    let datasets = json["datasets"].as_array().unwrap();
    assert_eq!(datasets[0]["label"], "Random Walk");
    assert_eq!(datasets[1]["label"], "ARIMA(2,0,0)");

    let first_key = datasets[0]["data"].as_object().unwrap().keys().next().unwrap();
    assert_eq!(first_key, "2012-01-01");
}

#[tokio::test]
async fn test_get_forecast_accuracy() {
    let json = get_json(default_app(), "/get-forecast-accuracy").await;

    assert_eq!(json["horizon"], 12);
    assert_eq!(json["models"].as_array().unwrap().len(), 2);
    assert!(json["models"][0]["metrics"]["rmse"].is_number());
}

#[tokio::test]
async fn test_health() {
    let json = get_json(default_app(), "/health").await;
    assert_eq!(json["status"], "alive");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let response = default_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_failure_is_generic_500() {
    let mut config = ForecastConfig::default();
    config.forecasts.true_series = LabeledSource {
        label: "True Line".to_string(),
        source: SeriesSource::File(FileSeries::new("/nonexistent/true_line.tsv")),
    };
    let router = app(AppState::new(ChartService::new(config).unwrap()));

    let (status, body) = get(router, "/get-data-forecasts").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(String::from_utf8(body).unwrap(), "Internal Server Error");
}

#[tokio::test]
async fn test_short_true_line_is_500() {
    let mut config = ForecastConfig::default();
    config.forecasts.true_series = LabeledSource {
        label: "True Line".to_string(),
        source: SeriesSource::Mock(MockSeries::new(
            parse_month("2020-01").unwrap(),
            parse_month("2020-06").unwrap(),
            100.0,
            10.0,
        )),
    };
    config.forecasts.origin_start = None;
    let router = app(AppState::new(ChartService::new(config).unwrap()));

    let (status, _) = get(router, "/get-data-forecasts").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_failing_model_aborts_with_500() {
    let mut config = ForecastConfig::default();
    config
        .forecasts
        .models
        .push(NamedModel::new("Mean of 200", ModelSpec::RandomWalk { lags: 200 }));
    let router = app(AppState::new(ChartService::new(config).unwrap()));

    let (status, body) = get(router.clone(), "/get-data-forecasts").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(String::from_utf8(body).unwrap(), "Internal Server Error");

    let (status, _) = get(router, "/get-forecast-accuracy").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(default_app(), "/get-everything").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
