use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use traffic_forecast::{
    chart, ChartError, Coordinate, Dashboard, DashboardView, ForecastDuration, Session,
};

use crate::page;

/// Dashboard adapters, the session and the most recent pass. One lock
/// covers all of it, so render passes never overlap.
struct DashboardState {
    dashboard: Dashboard,
    session: Session,
    last_view: Option<DashboardView>,
}

pub struct AppState {
    inner: Mutex<DashboardState>,
    default_duration: ForecastDuration,
    refresh_interval_secs: u64,
}

impl AppState {
    pub fn new(
        dashboard: Dashboard,
        session: Session,
        default_duration: ForecastDuration,
        refresh_interval_secs: u64,
    ) -> Self {
        Self {
            inner: Mutex::new(DashboardState {
                dashboard,
                session,
                last_view: None,
            }),
            default_duration,
            refresh_interval_secs,
        }
    }

    /// Runs a render pass, optionally selecting a new coordinate first.
    async fn render(
        &self,
        coordinate: Option<Coordinate>,
        duration: ForecastDuration,
    ) -> DashboardView {
        let mut guard = self.inner.lock().await;
        if let Some(c) = coordinate {
            guard.session.select(c);
        }
        guard.render(duration).await
    }

    /// The most recent pass, rendering one if none has happened yet.
    async fn latest(&self) -> DashboardView {
        let mut guard = self.inner.lock().await;
        if let Some(view) = &guard.last_view {
            return view.clone();
        }
        guard.render(self.default_duration).await
    }
}

impl DashboardState {
    async fn render(&mut self, duration: ForecastDuration) -> DashboardView {
        let view = self
            .dashboard
            .render(&mut self.session, duration, Local::now())
            .await;
        self.last_view = Some(view.clone());
        view
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

impl From<ChartError> for AppError {
    fn from(e: ChartError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub duration: Option<u32>,
}

impl DashboardQuery {
    fn coordinate(&self) -> Result<Option<Coordinate>, AppError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let c = Coordinate::new(lat, lon);
                if c.is_finite() {
                    Ok(Some(c))
                } else {
                    Err(AppError::BadRequest(
                        "Coordinates must be finite numbers".to_string(),
                    ))
                }
            }
            (None, None) => Ok(None),
            _ => Err(AppError::BadRequest(
                "Both lat and lon are required to select a location".to_string(),
            )),
        }
    }

    fn duration(&self, default: ForecastDuration) -> Result<ForecastDuration, AppError> {
        match self.duration {
            Some(hours) => {
                ForecastDuration::try_from(hours).map_err(|e| AppError::BadRequest(e.to_string()))
            }
            None => Ok(default),
        }
    }
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let coordinate = query.coordinate()?;
    let duration = query.duration(state.default_duration)?;

    let view = state.render(coordinate, duration).await;
    let html = page::render_page(&view, state.refresh_interval_secs)?;
    Ok(Html(html))
}

async fn chart_svg(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let view = state.latest().await;
    let svg = chart::render_svg(&view.series, chart::CHART_WIDTH, chart::CHART_HEIGHT)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn chart_png(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let view = state.latest().await;
    let png = chart::render_png(&view.series, chart::CHART_WIDTH, chart::CHART_HEIGHT)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn api_forecast(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.latest().await)
}

async fn forecast_csv(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let view = state.latest().await;
    let mut buf = Vec::new();
    view.series
        .write_csv(&mut buf)
        .map_err(|e| AppError::Internal(format!("Failed to write CSV: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buf).into_response())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chart.svg", get(chart_svg))
        .route("/chart.png", get(chart_png))
        .route("/api/forecast", get(api_forecast))
        .route("/forecast.csv", get(forecast_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
