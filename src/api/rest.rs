// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The dashboard is read-only and
// unauthenticated; every endpoint is a GET that triggers one synchronous
// fetch-and-compute cycle against the data provider.
//
// Response mapping: `Fetched::Data` => 200, `Fetched::Empty` => 404,
// `Fetched::Failed` => 502, malformed request parameters => 400.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analysis::{is_plausible_ticker, is_valid_period, AnalysisService};
use crate::config::AppConfig;
use crate::types::Fetched;

/// Shared state behind every handler: a config snapshot and the stateless
/// analysis service. No locks — nothing here mutates.
pub struct AppState {
    pub config: AppConfig,
    pub service: AnalysisService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let service = AnalysisService::from_config(&config);
        Self { config, service }
    }
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        // ── Stocks ──────────────────────────────────────────────────
        .route("/api/v1/stocks/:ticker/history", get(history))
        .route("/api/v1/stocks/:ticker/indicators", get(indicators))
        .route("/api/v1/stocks/:ticker/signals", get(signals))
        .route("/api/v1/stocks/:ticker/levels", get(levels))
        .route("/api/v1/stocks/:ticker/performance", get(performance))
        .route("/api/v1/stocks/:ticker/metrics", get(metrics))
        .route("/api/v1/stocks/:ticker/dividends", get(dividends))
        .route("/api/v1/stocks/:ticker/validate", get(validate))
        .route("/api/v1/compare", get(compare))
        // ── Options ─────────────────────────────────────────────────
        .route("/api/v1/options/:ticker", get(options_report))
        .route("/api/v1/options/:ticker/expiries", get(option_expiries))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Response plumbing
// =============================================================================

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Map a fetch outcome onto an HTTP response.
fn respond<T: Serialize>(ticker: &str, fetched: Fetched<T>) -> Response {
    match fetched {
        Fetched::Data(payload) => Json(payload).into_response(),
        Fetched::Empty => error_body(
            StatusCode::NOT_FOUND,
            format!("no data available for {ticker}"),
        ),
        Fetched::Failed(reason) => {
            warn!(ticker, reason, "provider fetch failed");
            error_body(
                StatusCode::BAD_GATEWAY,
                format!("upstream data provider error: {reason}"),
            )
        }
    }
}

/// Normalize and validate a ticker path parameter.
fn check_ticker(raw: &str) -> Result<String, Response> {
    let ticker = raw.trim().to_uppercase();
    if !is_plausible_ticker(&ticker) {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            format!("invalid ticker symbol: '{raw}'"),
        ));
    }
    Ok(ticker)
}

/// Resolve the `period` query parameter against the allow-list, falling back
/// to the configured default.
fn check_period(requested: Option<String>, state: &AppState) -> Result<String, Response> {
    let period = requested.unwrap_or_else(|| state.config.default_period.clone());
    if !is_valid_period(&period) {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            format!("invalid period: '{period}'"),
        ));
    }
    Ok(period)
}

#[derive(Deserialize)]
struct PeriodParams {
    period: Option<String>,
}

#[derive(Deserialize)]
struct LevelParams {
    period: Option<String>,
    window: Option<usize>,
}

#[derive(Deserialize)]
struct CompareParams {
    /// Comma-separated ticker list, e.g. `tickers=AAPL,MSFT,GOOG`.
    tickers: String,
    period: Option<String>,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Stock endpoints
// =============================================================================

async fn history(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.history(&ticker, &period).await)
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.indicators(&ticker, &period).await)
}

async fn signals(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.signals(&ticker, &period).await)
}

async fn levels(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<LevelParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if params.window == Some(0) {
        return error_body(StatusCode::BAD_REQUEST, "window must be at least 1");
    }
    respond(
        &ticker,
        state.service.levels(&ticker, &period, params.window).await,
    )
}

async fn performance(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.performance(&ticker, &period).await)
}

async fn metrics(State(state): State<Arc<AppState>>, Path(ticker): Path<String>) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.financial_metrics(&ticker).await)
}

async fn dividends(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.dividends(&ticker, &period).await)
}

async fn validate(State(state): State<Arc<AppState>>, Path(ticker): Path<String>) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match state.service.validate_ticker(&ticker).await {
        Fetched::Data(valid) => {
            Json(serde_json::json!({ "ticker": ticker, "valid": valid })).into_response()
        }
        Fetched::Empty => {
            Json(serde_json::json!({ "ticker": ticker, "valid": false })).into_response()
        }
        Fetched::Failed(reason) => {
            warn!(ticker, reason, "ticker validation failed");
            error_body(
                StatusCode::BAD_GATEWAY,
                format!("upstream data provider error: {reason}"),
            )
        }
    }
}

async fn compare(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareParams>,
) -> Response {
    let mut tickers = Vec::new();
    for raw in params.tickers.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match check_ticker(raw) {
            Ok(t) => tickers.push(t),
            Err(resp) => return resp,
        }
    }
    if tickers.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "no tickers supplied");
    }
    let period = match check_period(params.period, &state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let label = tickers.join(",");
    respond(&label, state.service.compare(&tickers, &period).await)
}

// =============================================================================
// Options endpoints
// =============================================================================

async fn options_report(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.options(&ticker).await)
}

async fn option_expiries(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Response {
    let ticker = match check_ticker(&ticker) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    respond(&ticker, state.service.option_expiries(&ticker).await)
}

// =============================================================================
// Tests
// =============================================================================
