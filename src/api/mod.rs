use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CalcError, ComputeOptions, InflationRecord, SalaryEvent, SalaryHistory,
    YearMonth, compute, parse_event, validate_event,
};

pub mod share;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug)]
#[command(
    name = "realwage",
    about = "Salary history versus inflation: real value, raise targets and state contribution"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the monthly series and summary for a salary history
    Compute(ComputeArgs),
    /// Print the share-link query for a salary history
    Share(ShareArgs),
    /// Serve the calculator as a JSON HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ComputeArgs {
    #[arg(
        long,
        help = "JSON file with inflation records, e.g. [{\"date\": \"2021-11\", \"rate\": 7.88}]"
    )]
    pub inflation: PathBuf,
    #[arg(
        long = "salary",
        value_name = "YYYY-MM=AMOUNT",
        help = "Net salary taking effect in a month; repeat for every change"
    )]
    pub salaries: Vec<String>,
    #[arg(
        long,
        help = "Share link or query string (date0=..&salary0=..) to read salaries from"
    )]
    pub share_link: Option<String>,
    #[arg(
        long,
        default_value_t = false,
        help = "Use the flat 41.5% contribution rate instead of the historical exemption"
    )]
    pub no_tax_exempt: bool,
    #[arg(
        long,
        value_name = "YYYY-MM",
        help = "Calculation month; defaults to the current month"
    )]
    pub as_of: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ShareArgs {
    #[arg(long = "salary", value_name = "YYYY-MM=AMOUNT", required = true)]
    pub salaries: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, help = "JSON file with inflation records served to every request")]
    pub inflation: PathBuf,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
}

#[derive(Debug, Clone, PartialEq)]
struct ComputeRequest {
    events: Vec<SalaryEvent>,
    options: ComputeOptions,
}

#[derive(Debug, Deserialize)]
struct SalaryPayload {
    date: String,
    salary: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComputePayload {
    salaries: Vec<SalaryPayload>,
    tax_exempt: Option<bool>,
    as_of: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SharePayload {
    salaries: Vec<SalaryPayload>,
}

#[derive(Debug, Serialize)]
struct ShareResponse {
    query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InflationSummary {
    records: usize,
    first_month: Option<YearMonth>,
    last_month: Option<YearMonth>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

#[derive(Clone)]
struct AppState {
    inflation: Arc<Vec<InflationRecord>>,
}

/// The current calendar month in the local time zone.
pub fn current_month() -> Result<YearMonth, String> {
    month_of(jiff::Zoned::now().date())
}

fn month_of(date: jiff::civil::Date) -> Result<YearMonth, String> {
    u8::try_from(date.month())
        .ok()
        .and_then(|month| YearMonth::new(i32::from(date.year()), month))
        .ok_or_else(|| format!("system date {date} is outside the supported years 0000-9999"))
}

pub fn load_inflation(path: &Path) -> Result<Vec<InflationRecord>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read inflation data {}: {e}", path.display()))?;
    let records: Vec<InflationRecord> = serde_json::from_str(&raw)
        .map_err(|e| format!("Invalid inflation data {}: {e}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "inflation data loaded");
    Ok(records)
}

/// The requested calculation month, which may not lie after `today`.
fn resolve_as_of(raw: Option<&str>, today: YearMonth) -> Result<YearMonth, CalcError> {
    let Some(raw) = raw else {
        return Ok(today);
    };
    let as_of = YearMonth::parse(raw.trim())?;
    if as_of > today {
        return Err(CalcError::FutureDateRejected(as_of));
    }
    Ok(as_of)
}

/// Parses a `YYYY-MM=AMOUNT` command line entry.
fn parse_salary_arg(raw: &str, as_of: YearMonth) -> Result<SalaryEvent, String> {
    let Some((date, amount)) = raw.split_once('=') else {
        return Err(format!("--salary {raw:?} must look like YYYY-MM=AMOUNT"));
    };
    parse_event(date, amount, as_of).map_err(|e| format!("--salary {raw:?}: {e}"))
}

fn history_from_args(salaries: &[String], as_of: YearMonth) -> Result<SalaryHistory, String> {
    let mut history = SalaryHistory::new();
    for raw in salaries {
        let event = parse_salary_arg(raw, as_of)?;
        history.add(event, as_of).map_err(|e| e.to_string())?;
    }
    Ok(history)
}

fn request_from_args(args: &ComputeArgs, today: YearMonth) -> Result<ComputeRequest, String> {
    let as_of =
        resolve_as_of(args.as_of.as_deref(), today).map_err(|e| format!("--as-of: {e}"))?;

    let mut events = history_from_args(&args.salaries, as_of)?.events().to_vec();
    if let Some(link) = &args.share_link {
        let params = share::params_from_link(link)?;
        let shared = share::decode(&params).map_err(|e| format!("--share-link: {e}"))?;
        events.extend(shared);
    }
    if events.is_empty() {
        return Err("at least one --salary or a --share-link with salaries is required".to_string());
    }

    Ok(ComputeRequest {
        events,
        options: ComputeOptions {
            tax_exempt: !args.no_tax_exempt,
            as_of,
        },
    })
}

pub fn run_compute(args: &ComputeArgs) -> Result<String, String> {
    let request = request_from_args(args, current_month()?)?;
    let inflation = load_inflation(&args.inflation)?;
    let computation =
        compute(&request.events, &inflation, request.options).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&computation).map_err(|e| format!("Cannot serialize result: {e}"))
}

pub fn run_share(args: &ShareArgs) -> Result<String, String> {
    let history = history_from_args(&args.salaries, current_month()?)?;
    Ok(share::encode(history.events()))
}

fn events_from_payload(
    salaries: &[SalaryPayload],
    as_of: YearMonth,
) -> Result<Vec<SalaryEvent>, CalcError> {
    salaries
        .iter()
        .map(|raw| {
            let event = SalaryEvent::new(YearMonth::parse(raw.date.trim())?, raw.salary);
            validate_event(&event, as_of)?;
            Ok(event)
        })
        .collect()
}

fn request_from_payload(
    payload: ComputePayload,
    today: YearMonth,
) -> Result<ComputeRequest, CalcError> {
    let as_of = resolve_as_of(payload.as_of.as_deref(), today)?;
    Ok(ComputeRequest {
        events: events_from_payload(&payload.salaries, as_of)?,
        options: ComputeOptions {
            tax_exempt: payload.tax_exempt.unwrap_or(true),
            as_of,
        },
    })
}

fn request_from_query(
    params: &HashMap<String, String>,
    today: YearMonth,
) -> Result<ComputeRequest, CalcError> {
    let as_of = resolve_as_of(params.get("asOf").map(String::as_str), today)?;
    let tax_exempt = params
        .get("taxExempt")
        .map(|raw| {
            !["false", "0", "no"]
                .iter()
                .any(|off| raw.trim().eq_ignore_ascii_case(off))
        })
        .unwrap_or(true);
    Ok(ComputeRequest {
        events: share::decode(params)?,
        options: ComputeOptions { tax_exempt, as_of },
    })
}

#[cfg(test)]
fn request_from_json(json: &str, today: YearMonth) -> Result<ComputeRequest, String> {
    let payload = serde_json::from_str::<ComputePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(payload, today).map_err(|e| e.to_string())
}

pub async fn run_http_server(
    addr: SocketAddr,
    inflation: Vec<InflationRecord>,
) -> std::io::Result<()> {
    if inflation.is_empty() {
        warn!("serving without inflation data, every computation will fail");
    }
    let state = AppState {
        inflation: Arc::new(inflation),
    };
    let app = Router::new()
        .route(
            "/api/compute",
            get(compute_get_handler).post(compute_post_handler),
        )
        .route("/api/share", post(share_handler))
        .route("/api/inflation", get(inflation_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "salary calculator API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

fn today_or_response() -> Result<YearMonth, Response> {
    current_month().map_err(|msg| {
        warn!(error = %msg, "cannot determine the current month");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg, None)
    })
}

async fn compute_get_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let today = match today_or_response() {
        Ok(today) => today,
        Err(response) => return response,
    };
    compute_response(&state, request_from_query(&params, today))
}

async fn compute_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<ComputePayload>,
) -> Response {
    let today = match today_or_response() {
        Ok(today) => today,
        Err(response) => return response,
    };
    compute_response(&state, request_from_payload(payload, today))
}

async fn share_handler(Json(payload): Json<SharePayload>) -> Response {
    let today = match today_or_response() {
        Ok(today) => today,
        Err(response) => return response,
    };
    match events_from_payload(&payload.salaries, today) {
        Ok(events) => json_response(
            StatusCode::OK,
            ShareResponse {
                query: share::encode(&events),
            },
        ),
        Err(err) => calc_error_response(&err),
    }
}

async fn inflation_handler(State(state): State<AppState>) -> Response {
    let records = state.inflation.as_slice();
    json_response(
        StatusCode::OK,
        InflationSummary {
            records: records.len(),
            first_month: records.iter().map(|r| r.year_month).min(),
            last_month: records.iter().map(|r| r.year_month).max(),
        },
    )
}

fn compute_response(state: &AppState, request: Result<ComputeRequest, CalcError>) -> Response {
    let result = request.and_then(|request| {
        compute(&request.events, &state.inflation, request.options)
    });
    match result {
        Ok(computation) => {
            debug!(months = computation.series.len(), "computation served");
            json_response(StatusCode::OK, computation)
        }
        Err(err) => calc_error_response(&err),
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

fn error_response(status: StatusCode, msg: &str, kind: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            kind,
        },
    )
}

fn calc_error_status(err: &CalcError) -> StatusCode {
    if err.is_malformed_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn calc_error_response(err: &CalcError) -> Response {
    debug!(kind = err.kind(), error = %err, "computation rejected");
    error_response(calc_error_status(err), &err.to_string(), Some(err.kind()))
}
