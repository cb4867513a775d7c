mod app;
mod page;

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use traffic_forecast::{Config, Dashboard, Session};

use app::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve the traffic and weather forecast dashboard")]
struct Args {
    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// HTTP server port
    #[arg(long, default_value = "8080")]
    port: u16,
    /// Seconds between automatic page refreshes (overrides the config file)
    #[arg(long)]
    refresh_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    traffic_forecast::init_tracing();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }
    if let Some(secs) = args.refresh_interval {
        config.refresh_interval_secs = secs;
    }
    if config.api_key.is_none() {
        tracing::warn!("No OpenWeather API key configured; forecasts will be empty");
    }

    let dashboard = Dashboard::from_config(&config).context("Failed to build HTTP client")?;
    let state = Arc::new(AppState::new(
        dashboard,
        Session::new(config.default_coordinate()),
        config.default_duration,
        config.refresh_interval_secs,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Dashboard listening on http://{}", addr);
    tracing::info!(
        "Default location {}, refresh every {}s",
        config.default_coordinate(),
        config.refresh_interval_secs
    );

    axum::serve(listener, app::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
