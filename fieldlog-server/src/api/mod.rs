//! HTTP API endpoints

use crate::settings::Settings;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use fieldlog_core::{FlushOutcome, LogEngine, LogError, Measurement, WeekKey};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Candidate sampling intervals, in minutes, for the retention planner
const PLANNING_INTERVALS_MIN: [u64; 7] = [1, 5, 10, 15, 20, 30, 60];

/// Application state shared by handlers and the sampler
pub struct AppState {
    pub engine: Arc<Mutex<LogEngine>>,
    pub settings: Mutex<Settings>,
    pub settings_path: PathBuf,
    pub interval_seconds: Arc<AtomicU64>,
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the API router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))

        // Segment retrieval
        .route("/api/weeks", get(list_weeks))
        .route("/api/weeks/:key", get(download_week))
        .route("/api/export", get(export_manifest))

        // Capacity and logger state
        .route("/api/storage", get(storage_info))
        .route("/api/status", get(status))

        // Logger control
        .route("/api/toggle", post(toggle))
        .route("/api/flush", post(flush))

        // Destructive maintenance (authenticated)
        .route("/api/delete_oldest", post(delete_oldest))
        .route("/api/delete_before", post(delete_before))
        .route("/api/delete_all", post(delete_all))

        // Service settings
        .route("/api/settings", get(get_settings).post(set_settings))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct WeeksResponse {
    pub weeks: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StorageResponse {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: u64,
    pub weeks_possible_for_interval: Vec<IntervalEstimate>,
}

#[derive(Debug, Serialize)]
pub struct IntervalEstimate {
    pub interval_minutes: u64,
    pub weeks: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub active: bool,
    pub pending: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_measurement: Option<Measurement>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flush_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub flushed: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteOldestResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBeforeParams {
    before: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: fieldlog_core::VERSION.to_string(),
    })
}

async fn list_weeks(State(state): State<SharedState>) -> Result<Json<WeeksResponse>, ApiError> {
    let weeks = state.engine.lock().weeks().map_err(map_engine_error)?;
    Ok(Json(WeeksResponse {
        weeks: weeks.iter().map(WeekKey::to_string).collect(),
    }))
}

async fn download_week(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let key = parse_week_param(&key)?;
    let content = state.engine.lock().read_week(&key).map_err(map_engine_error)?;

    Ok((csv_attachment_headers(&key), content).into_response())
}

async fn export_manifest(
    State(state): State<SharedState>,
) -> Result<Json<ExportResponse>, ApiError> {
    let weeks = state.engine.lock().weeks().map_err(map_engine_error)?;
    Ok(Json(ExportResponse {
        files: weeks.iter().map(WeekKey::file_name).collect(),
    }))
}

async fn storage_info(
    State(state): State<SharedState>,
) -> Result<Json<StorageResponse>, ApiError> {
    let engine = state.engine.lock();
    let usage = engine.usage().map_err(map_engine_error)?;

    let estimates = PLANNING_INTERVALS_MIN
        .iter()
        .map(|&minutes| IntervalEstimate {
            interval_minutes: minutes,
            weeks: engine.policy().weeks_at_interval(minutes),
        })
        .collect();

    Ok(Json(StorageResponse {
        used_bytes: usage.used_bytes,
        total_bytes: usage.total_bytes,
        percent: usage.percent(),
        weeks_possible_for_interval: estimates,
    }))
}

async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let engine = state.engine.lock();
    Json(StatusResponse {
        active: engine.is_active(),
        pending: engine.pending_len(),
        last_measurement: engine.last_measurement(),
    })
}

async fn toggle(State(state): State<SharedState>) -> Json<ToggleResponse> {
    let mut engine = state.engine.lock();
    let target = !engine.is_active();
    // Pausing flushes; a failed flush is reported but does not block
    // the transition.
    let flush_error = engine.set_active(target).err().map(|e| e.to_string());

    Json(ToggleResponse {
        active: engine.is_active(),
        flush_error,
    })
}

async fn flush(State(state): State<SharedState>) -> Result<Json<FlushResponse>, ApiError> {
    let outcome = state.engine.lock().flush().map_err(map_engine_error)?;
    let flushed = match outcome {
        FlushOutcome::Flushed(n) => n,
        FlushOutcome::Empty => 0,
    };
    Ok(Json(FlushResponse { flushed }))
}

async fn delete_oldest(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<DeleteOldestResponse>, ApiError> {
    check_auth(&headers, &state.settings.lock().http_password)?;

    let deleted = state
        .engine
        .lock()
        .delete_oldest()
        .map_err(map_engine_error)?;
    Ok(Json(DeleteOldestResponse { deleted }))
}

async fn delete_before(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<DeleteBeforeParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    check_auth(&headers, &state.settings.lock().http_password)?;

    let reference = parse_week_param(&params.before)?;
    let deleted = state
        .engine
        .lock()
        .delete_before(&reference)
        .map_err(map_engine_error)?;
    Ok(Json(DeleteResponse { deleted }))
}

async fn delete_all(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    check_auth(&headers, &state.settings.lock().http_password)?;

    let deleted = state.engine.lock().delete_all().map_err(map_engine_error)?;
    Ok(Json(DeleteResponse { deleted }))
}

async fn get_settings(State(state): State<SharedState>) -> Json<Settings> {
    Json(state.settings.lock().clone())
}

async fn set_settings(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(new_settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    check_auth(&headers, &state.settings.lock().http_password)?;

    if new_settings.interval_seconds == 0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "interval_seconds must be positive",
        ));
    }

    new_settings
        .save(&state.settings_path)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    // The sampler picks the new interval up on its next tick
    state
        .interval_seconds
        .store(new_settings.interval_seconds, Ordering::Relaxed);
    *state.settings.lock() = new_settings.clone();

    Ok(Json(new_settings))
}

// ============================================================================
// Helpers
// ============================================================================

/// Check the pre-shared secret on a destructive request
///
/// A missing header is distinguished from a wrong one so clients can
/// tell "not authenticated" from "bad secret".
fn check_auth(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    match headers.get("x-auth") {
        None => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "missing x-auth header",
        )),
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        Some(_) => Err(error_response(StatusCode::FORBIDDEN, "wrong secret")),
    }
}

/// Parse a week key from a path or query parameter
///
/// The `.csv` suffix clients copy from file listings is accepted and
/// ignored.
fn parse_week_param(raw: &str) -> Result<WeekKey, ApiError> {
    let trimmed = raw.strip_suffix(".csv").unwrap_or(raw);
    trimmed
        .parse()
        .map_err(|e: LogError| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Headers marking a segment download as a named CSV attachment
fn csv_attachment_headers(key: &WeekKey) -> [(HeaderName, String); 2] {
    [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", key.file_name()),
        ),
    ]
}

fn map_engine_error(e: LogError) -> ApiError {
    let status = match &e {
        LogError::SegmentNotFound(_) => StatusCode::NOT_FOUND,
        LogError::InvalidFormat(_) | LogError::InvalidTime(_) => StatusCode::BAD_REQUEST,
        LogError::StorageExhausted => StatusCode::INSUFFICIENT_STORAGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_check_auth() {
        let mut headers = HeaderMap::new();
        let err = check_auth(&headers, "secret").unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        headers.insert("x-auth", HeaderValue::from_static("wrong"));
        let err = check_auth(&headers, "secret").unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);

        headers.insert("x-auth", HeaderValue::from_static("secret"));
        assert!(check_auth(&headers, "secret").is_ok());
    }

    #[test]
    fn test_parse_week_param() {
        assert_eq!(
            parse_week_param("2025-W03").unwrap().to_string(),
            "2025-W03"
        );
        assert_eq!(
            parse_week_param("2025-W03.csv").unwrap().to_string(),
            "2025-W03"
        );

        assert_eq!(parse_week_param("").unwrap_err().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_week_param("2025-03.csv").unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_csv_attachment_headers() {
        let key: WeekKey = "2025-W03".parse().unwrap();
        let headers = csv_attachment_headers(&key);

        assert_eq!(headers[0].0, header::CONTENT_TYPE);
        assert_eq!(headers[0].1, "text/csv; charset=utf-8");
        assert_eq!(headers[1].0, header::CONTENT_DISPOSITION);
        assert_eq!(headers[1].1, "attachment; filename=\"2025-W03.csv\"");
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (
                map_engine_error(LogError::SegmentNotFound("2025-W03".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                map_engine_error(LogError::InvalidFormat("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                map_engine_error(LogError::StorageExhausted),
                StatusCode::INSUFFICIENT_STORAGE,
            ),
            (
                map_engine_error(LogError::BufferFull),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.0, expected);
        }
    }
}
