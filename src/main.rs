use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::{fs, path::PathBuf};
use traffic_forecast::{chart, Config, Coordinate, Dashboard, ForecastDuration, Session};

fn parse_duration(s: &str) -> Result<ForecastDuration, String> {
    let hours: u32 = s.parse().map_err(|e| format!("{e}"))?;
    ForecastDuration::try_from(hours).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Render a traffic and weather forecast once")]
struct Args {
    /// Latitude (e.g. 28.6139)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude (e.g. 77.2090)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Forecast duration in hours: 3, 6, ..., 24
    #[arg(long, value_parser = parse_duration)]
    duration: Option<ForecastDuration>,
    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the chart as SVG
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Write the chart as PNG
    #[arg(long)]
    png: Option<PathBuf>,
    /// Write the series as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    traffic_forecast::init_tracing();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }

    let coordinate = Coordinate::new(
        args.lat.unwrap_or(config.default_latitude),
        args.lon.unwrap_or(config.default_longitude),
    );
    anyhow::ensure!(coordinate.is_finite(), "Coordinates must be finite numbers");
    let duration = args.duration.unwrap_or(config.default_duration);

    let mut dashboard = Dashboard::from_config(&config).context("Failed to build HTTP client")?;
    let mut session = Session::new(coordinate);
    let view = dashboard.render(&mut session, duration, Local::now()).await;

    println!("\n=== Traffic & Temperature Forecast ===");
    println!("Location: {}", view.location);
    println!("Coordinate: {}", view.coordinate);
    if let Some(notice) = &view.notice {
        println!("Warning: {notice}");
    }
    println!();
    println!("{:<6} {:>8} {:>9}  {}", "Hour", "Traffic", "Temp (C)", "Weather");
    for point in &view.series.points {
        let temp = point
            .temperature
            .map(|t| format!("{t:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:>8} {:>9}  {}",
            point.hour, point.traffic, temp, point.description
        );
    }

    if let Some(path) = &args.svg {
        let svg = chart::render_svg(&view.series, chart::CHART_WIDTH, chart::CHART_HEIGHT)?;
        fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Chart SVG written: {}", path.display());
    }

    if let Some(path) = &args.png {
        let png = chart::render_png(&view.series, chart::CHART_WIDTH, chart::CHART_HEIGHT)?;
        fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Chart PNG written: {}", path.display());
    }

    if let Some(path) = &args.csv {
        let file =
            fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        view.series.write_csv(file)?;
        println!("Series CSV written: {}", path.display());
    }

    Ok(())
}
