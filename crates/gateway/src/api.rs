//! Session-scoped query API.
//!
//! Endpoints:
//!
//! - `POST /api/session`        - Create a session and its notification queue
//! - `POST /api/query`          - Start answering a query for a session
//! - `GET  /api/notifications`  - Drain a session's queued notifications
//!
//! A query returns immediately with `{"status": "processing"}`; progress and
//! the final answer arrive through the session's queue.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use productdesk_agent::Coordinator;
use productdesk_core::event::{Notification, Notifier, RecordingNotifier};

// ── State ─────────────────────────────────────────────────────────────────

/// Maximum number of in-memory sessions before the oldest is evicted.
const MAX_SESSIONS: usize = 1_000;

struct Session {
    queue: Arc<RecordingNotifier>,
    created_at: DateTime<Utc>,
}

/// Shared state: one coordinator, many sessions.
pub struct GatewayState {
    pub coordinator: Arc<Coordinator>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl GatewayState {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn queue(&self, session_id: &str) -> Option<Arc<RecordingNotifier>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.queue.clone())
    }
}

pub type SharedState = Arc<GatewayState>;

// ── Router ────────────────────────────────────────────────────────────────

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/session", post(create_session_handler))
        .route("/api/query", post(query_handler))
        .route("/api/notifications", get(notifications_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryAccepted {
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Non-blank trimmed value of an optional field.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Serialized notification with the owning session attached.
fn tagged(notification: &Notification, session_id: &str) -> Option<serde_json::Value> {
    let mut value = serde_json::to_value(notification).ok()?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert("session_id".into(), session_id.into());
    }
    Some(value)
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(State(state): State<SharedState>) -> Json<SessionResponse> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let queue = Arc::new(RecordingNotifier::new());

    queue.notify(Notification::system("Setting up NVIDIA Sales Agent..."));
    queue.notify(Notification::system(format!(
        "NVIDIA Sales Agent ready with {} product domains ({})",
        state.coordinator.registry().len(),
        state.coordinator.client().provider_name()
    )));

    let mut sessions = state.sessions.write().await;
    if sessions.len() >= MAX_SESSIONS {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, s)| s.created_at)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            debug!(session = %id, "Evicting oldest session");
            sessions.remove(&id);
        }
    }
    sessions.insert(
        session_id.clone(),
        Session {
            queue,
            created_at: Utc::now(),
        },
    );

    info!(session = %session_id, "Session created");
    Json(SessionResponse { session_id })
}

async fn query_handler(
    State(state): State<SharedState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryAccepted>, ApiError> {
    let (Some(session_id), Some(query)) = (required(payload.session_id), required(payload.query))
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing session_id or query",
        ));
    };

    let queue = state
        .queue(&session_id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Invalid session_id"))?;

    info!(session = %session_id, query_len = query.len(), "Query accepted");

    let coordinator = state.coordinator.clone();
    tokio::spawn(async move {
        coordinator.process_query_with(&query, queue.as_ref()).await;
        debug!(session = %session_id, "Query finished");
    });

    Ok(Json(QueryAccepted {
        status: "processing".into(),
    }))
}

async fn notifications_handler(
    State(state): State<SharedState>,
    Query(params): Query<NotificationParams>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let session_id = required(params.session_id)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing session_id"))?;

    let queue = state
        .queue(&session_id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Invalid session_id"))?;

    let notifications = queue
        .drain()
        .iter()
        .filter_map(|n| tagged(n, &session_id))
        .collect();

    Ok(Json(NotificationsResponse { notifications }))
}

// ── Tests ─────────────────────────────────────────────────────────────────
