use forecast_server::{app, AppState, ServerError, ServerSettings};
use price_forecast::{ChartService, ForecastConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "forecast_server=info,price_forecast=info,tower_http=info".into()
            }),
        )
        .init();

    let settings = ServerSettings::from_env()?;
    let config = match &settings.config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading forecast configuration");
            ForecastConfig::from_file(path)?
        }
        None => ForecastConfig::default(),
    };

    let state = AppState::new(ChartService::new(config)?);
    let addr = settings.addr()?;

    tracing::info!(
        "forecast_server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
