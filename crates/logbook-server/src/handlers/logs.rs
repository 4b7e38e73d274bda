//! `/api/v1/logs` handlers: append, session views, history and the refused
//! mutation routes.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use logbook_ledger::{ExerciseHistory, LatestSession, LogRecord, NewLogRecord, Session, SetData};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, instrument};

use crate::config::QueryLimits;
use crate::error::ApiError;
use crate::metrics::{LEDGER_APPENDS_TOTAL, LEDGER_SESSIONS_SERVED_TOTAL};
use crate::server::AppState;

/// Query string for the session views.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Maximum gap between consecutive sets of one session, in hours.
    pub session_threshold_hours: Option<f64>,
}

/// Query string for the history view.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Restrict to one exercise.
    pub exercise_name: Option<String>,
    /// Maximum number of entries.
    pub limit: Option<u32>,
}

/// One session in the sessions view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Timestamp of the first set in set order.
    pub session_timestamp: DateTime<Utc>,
    /// Number of sets.
    pub total_sets: usize,
    /// Sets ordered by set number.
    pub sets: Vec<SetData>,
}

impl SessionSummary {
    fn from_session(session: &Session<LogRecord>) -> Option<Self> {
        Some(Self {
            session_timestamp: session.session_timestamp()?,
            total_sets: session.len(),
            sets: session.records.iter().map(LogRecord::to_set_data).collect(),
        })
    }
}

/// Sessions view response, newest session first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsResponse {
    /// User the sessions belong to.
    pub user_id: String,
    /// Exercise the sessions belong to.
    pub exercise_name: String,
    /// Number of sessions.
    pub total_sessions: usize,
    /// Sessions, newest first.
    pub sessions: Vec<SessionSummary>,
}

/// POST /api/v1/logs
#[instrument(skip_all)]
pub async fn append_log(
    State(state): State<AppState>,
    payload: Result<Json<NewLogRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<LogRecord>), ApiError> {
    let Json(input) = payload?;
    let store = state.store.clone();
    let record = task::spawn_blocking(move || store.append(input)).await??;

    counter!(LEDGER_APPENDS_TOTAL).increment(1);
    debug!(id = %record.id, "log entry created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/logs/{user_id}/{exercise_name}/latest-session
#[instrument(skip_all)]
pub async fn latest_session(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<LatestSession>, ApiError> {
    let Path((user_id, raw_exercise)) = path?;
    let Query(query) = query?;
    let exercise = exercise_from_path(&raw_exercise)?;
    let threshold = session_threshold(&state.limits, query.session_threshold_hours)?;

    let store = state.store.clone();
    let exercise_for_task = exercise.clone();
    let latest = task::spawn_blocking(move || {
        store.latest_session(&user_id, &exercise_for_task, threshold)
    })
    .await??;

    let latest =
        latest.ok_or_else(|| ApiError::NotFound(format!("No previous session found for {exercise}")))?;
    counter!(LEDGER_SESSIONS_SERVED_TOTAL, "view" => "latest").increment(1);
    Ok(Json(latest))
}

/// GET /api/v1/logs/{user_id}/{exercise_name}/sessions
#[instrument(skip_all)]
pub async fn sessions(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let Path((user_id, raw_exercise)) = path?;
    let Query(query) = query?;
    let exercise = exercise_from_path(&raw_exercise)?;
    let threshold = session_threshold(&state.limits, query.session_threshold_hours)?;

    let store = state.store.clone();
    let (user, name) = (user_id.clone(), exercise.clone());
    let sessions =
        task::spawn_blocking(move || store.sessions(&user, &name, threshold)).await??;

    let sessions: Vec<SessionSummary> =
        sessions.iter().filter_map(SessionSummary::from_session).collect();
    counter!(LEDGER_SESSIONS_SERVED_TOTAL, "view" => "all").increment(1);
    Ok(Json(SessionsResponse {
        user_id,
        exercise_name: exercise,
        total_sessions: sessions.len(),
        sessions,
    }))
}

/// GET /api/v1/logs/{user_id}/history
#[instrument(skip_all)]
pub async fn history(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<ExerciseHistory>, ApiError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let limit = history_limit(&state.limits, query.limit)?;
    let exercise = query
        .exercise_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let store = state.store.clone();
    let history =
        task::spawn_blocking(move || store.history(&user_id, exercise.as_deref(), limit))
            .await??;
    Ok(Json(history))
}

/// PUT or PATCH /api/v1/logs/{log_entry_id}
///
/// Always refused by the ledger; the body is passed through unread.
pub async fn update_log(
    State(state): State<AppState>,
    Path(log_entry_id): Path<String>,
    body: Bytes,
) -> Result<Json<LogRecord>, ApiError> {
    let store = state.store.clone();
    let record = task::spawn_blocking(move || store.update(&log_entry_id, body)).await??;
    Ok(Json(record))
}

/// DELETE /api/v1/logs/{log_entry_id}
///
/// Always refused by the ledger.
pub async fn delete_log(
    State(state): State<AppState>,
    Path(log_entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.clone();
    task::spawn_blocking(move || store.delete(&log_entry_id)).await??;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter resolution
// ─────────────────────────────────────────────────────────────────────────────

fn exercise_from_path(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid("exercise_name", "is required"));
    }
    Ok(trimmed.to_string())
}

fn session_threshold(limits: &QueryLimits, requested: Option<f64>) -> Result<Duration, ApiError> {
    let bounds = &limits.session;
    let hours = requested.unwrap_or(bounds.default_threshold_hours);
    if !bounds.accepts(hours) {
        return Err(ApiError::invalid(
            "session_threshold_hours",
            format!(
                "must be between {} and {}",
                bounds.min_threshold_hours, bounds.max_threshold_hours
            ),
        ));
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|_| ApiError::invalid("session_threshold_hours", "is too large"))
}

fn history_limit(limits: &QueryLimits, requested: Option<u32>) -> Result<u32, ApiError> {
    let bounds = &limits.history;
    let limit = requested.unwrap_or(bounds.default_limit);
    if limit == 0 || limit > bounds.max_limit {
        return Err(ApiError::invalid(
            "limit",
            format!("must be between 1 and {}", bounds.max_limit),
        ));
    }
    Ok(limit)
}
