mod load;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    AxisChange, BarClick, Dimension, DrillDown, FilterSet, FlagCounts, Projection, Run,
    RunCollection, RunFlags, SummarySession, SummaryStats, transform,
};

pub use load::{
    DetailRows, LoadError, SUMMARY_FILE, Summary, load_detail_rows, load_summary, parse_rows,
    parse_summary,
};

#[derive(Parser, Debug)]
#[command(
    name = "retirement-explorer",
    about = "Explore simulated retirement runs: filtered summary histograms and per-run drill-down"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Log at debug level unless RUST_LOG is set")]
    pub verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the summary and drill-down JSON API
    Serve(ServeArgs),
    /// Print the filtered summary projection as JSON
    Summary(SummaryArgs),
    /// Print the drill-down chart data of one run as JSON
    DrillDown(DrillDownArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
    #[command(flatten)]
    filters: FilterParams,
}

#[derive(Args, Debug)]
struct DrillDownArgs {
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
    #[arg(long, help = "Run index as listed in the summary document")]
    index: usize,
}

/// Optional filter bounds, shared by the CLI flags and the summary query string.
/// Market bounds are in percent.
#[derive(Args, Debug, Default, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterParams {
    #[arg(long)]
    age_min: Option<f64>,
    #[arg(long)]
    age_max: Option<f64>,
    #[arg(long)]
    balance_min: Option<f64>,
    #[arg(long)]
    balance_max: Option<f64>,
    #[arg(long, help = "Lower market return bound in percent, e.g. 4.5")]
    market_min: Option<f64>,
    #[arg(long, help = "Upper market return bound in percent, e.g. 8")]
    market_max: Option<f64>,
}

impl FilterParams {
    fn bounds(&self, dimension: Dimension) -> (Option<f64>, Option<f64>) {
        match dimension {
            Dimension::Age => (self.age_min, self.age_max),
            Dimension::Balance => (self.balance_min, self.balance_max),
            Dimension::Market => (self.market_min, self.market_max),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractPayload {
    #[serde(default)]
    filters: FilterSet,
    event: InteractionEvent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum InteractionEvent {
    Axis {
        dimension: Dimension,
        change: AxisChange,
    },
    Click(BarClick),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse<'a> {
    total_runs: usize,
    filters: FilterSet,
    stats: &'a SummaryStats,
    visible_flags: FlagCounts,
    #[serde(flatten)]
    projection: Projection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractResponse {
    filters: FilterSet,
    selected_run: Option<Run>,
    projection: Projection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DrillDownResponse {
    index: usize,
    flags: RunFlags,
    #[serde(flatten)]
    drill_down: DrillDown,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct AppState {
    results_dir: PathBuf,
    summary: Summary,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve(args) => {
            let summary = load_summary(&args.results_dir).map_err(|e| e.to_string())?;
            run_http_server(args.port, args.results_dir, summary)
                .await
                .map_err(|e| format!("server error: {e}"))
        }
        Command::Summary(args) => {
            let filters = build_filters(&args.filters)?;
            let summary = load_summary(&args.results_dir).map_err(|e| e.to_string())?;
            print_json(&summary_response(&summary, filters))
        }
        Command::DrillDown(args) => {
            let summary = load_summary(&args.results_dir).map_err(|e| e.to_string())?;
            let drill_down = drill_down_for(&args.results_dir, &summary, args.index)
                .map_err(|e| e.to_string())?;
            print_json(&drill_down)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

/// Bounds must come in pairs, be finite, and be ordered; they are never swapped.
fn build_filters(params: &FilterParams) -> Result<FilterSet, String> {
    let mut filters = FilterSet::new();
    for dimension in Dimension::ALL {
        let name = dimension.as_str();
        match params.bounds(dimension) {
            (None, None) => {}
            (Some(low), Some(high)) => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(format!("--{name}-min and --{name}-max must be finite"));
                }
                if low > high {
                    return Err(format!("--{name}-min must be <= --{name}-max"));
                }
                filters.set(dimension, low, high);
            }
            _ => {
                return Err(format!("--{name}-min and --{name}-max must be given together"));
            }
        }
    }
    Ok(filters)
}

fn validate_filters(filters: &FilterSet) -> Result<(), String> {
    for dimension in Dimension::ALL {
        if let Some(filter) = filters.get(dimension) {
            let name = dimension.as_str();
            if !filter.low.is_finite() || !filter.high.is_finite() {
                return Err(format!("{name} filter bounds must be finite"));
            }
            if filter.low > filter.high {
                return Err(format!("{name} filter low must be <= high"));
            }
        }
    }
    Ok(())
}

fn summary_response(summary: &Summary, filters: FilterSet) -> SummaryResponse<'_> {
    let session = SummarySession::with_filters(summary.runs.clone(), filters);
    let projection = session.projection();
    if projection.is_empty() {
        tracing::info!(total = session.runs().len(), "no runs match the filters");
    }
    SummaryResponse {
        total_runs: session.runs().len(),
        filters,
        stats: &summary.stats,
        visible_flags: summary.stats.flag_counts(&projection.filtered),
        projection,
    }
}

/// Runs past the end of the summary are unknown even if detail files exist.
fn drill_down_for(
    results_dir: &std::path::Path,
    summary: &Summary,
    index: usize,
) -> Result<DrillDownResponse, LoadError> {
    if index >= summary.runs.len() {
        return Err(LoadError::RunNotFound(index));
    }
    let rows = load_detail_rows(results_dir, index)?;
    Ok(DrillDownResponse {
        index,
        flags: summary.stats.flags(index),
        drill_down: transform(&rows.balances, &rows.events),
    })
}

fn interact(runs: &RunCollection, payload: InteractPayload) -> Result<InteractResponse, String> {
    validate_filters(&payload.filters)?;
    let mut session = SummarySession::with_filters(runs.clone(), payload.filters);
    let selected_run = match payload.event {
        InteractionEvent::Axis { dimension, change } => {
            session.handle_axis_change(dimension, change);
            validate_filters(session.filters())?;
            None
        }
        InteractionEvent::Click(click) => {
            session.resolve_click(&click).map_err(|e| e.to_string())?
        }
    };
    Ok(InteractResponse {
        filters: *session.filters(),
        selected_run,
        projection: session.projection(),
    })
}

pub async fn run_http_server(
    port: u16,
    results_dir: PathBuf,
    summary: Summary,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState {
        results_dir,
        summary,
    });

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "run explorer API listening");
    tracing::info!("local access: http://127.0.0.1:{port}/api/summary");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/summary", get(summary_handler))
        .route("/api/interact", post(interact_handler))
        .route("/api/runs/:index", get(drill_down_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(state))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Response {
    match build_filters(&params) {
        Ok(filters) => json_response(StatusCode::OK, summary_response(&state.summary, filters)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn interact_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InteractPayload>,
) -> Response {
    match interact(&state.summary.runs, payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn drill_down_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    match drill_down_for(&state.results_dir, &state.summary, index) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err @ LoadError::RunNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, &err.to_string())
        }
        Err(err) => {
            tracing::error!(index, error = %err, "drill-down load failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
