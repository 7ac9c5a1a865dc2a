//! HTTP request handlers for the gateway
//!
//! Malformed requests (bad url, unknown session, invalid focus) are rejected
//! with JSON errors before any stream opens; valid ones get a long-lived SSE
//! response fed by a spawned orchestration task.

use crate::products::run_product_analysis;
use crate::stream::{sse_response, ChannelSink};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use marlowe_domain::{AllowList, EventSink, Focus};
use marlowe_fraudcheck::FraudChecker;
use marlowe_search::SearchAggregator;
use marlowe_session::{
    CapacityPolicy, IdleTtlPolicy, InMemorySessionStore, InvestigationOrchestrator, SessionStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Investigation orchestrator over the in-memory session store
    pub orchestrator: Arc<InvestigationOrchestrator<InMemorySessionStore>>,
    /// Per-product fraud checker
    pub checker: Arc<FraudChecker>,
    /// Product-search aggregator
    pub aggregator: Arc<SearchAggregator>,
    /// Domain allow-list in effect
    pub allowlist: AllowList,
    /// Idle TTL for finished sessions
    pub session_idle_ttl: Duration,
    /// Hard cap on stored sessions
    pub session_capacity: usize,
}

/// Start-investigation request
#[derive(Debug, Deserialize)]
pub struct InvestigateRequest {
    /// Url to investigate
    pub url: String,
}

/// Deepen request
#[derive(Debug, Deserialize)]
pub struct DeepenRequest {
    /// Focus for this turn
    pub focus: String,
}

/// Product-analysis request
#[derive(Debug, Deserialize)]
pub struct AnalyzeProductsRequest {
    /// Free-text search queries
    pub queries: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Stored session count
    pub sessions: usize,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request is malformed
    BadRequest(String),
    /// The referenced session does not exist
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// POST /investigations - start a session and stream its first pass
async fn start_investigation(
    State(state): State<AppState>,
    Json(request): Json<InvestigateRequest>,
) -> Result<Response, AppError> {
    let url = request.url.trim().to_string();
    if url.is_empty() || !url.contains('.') {
        return Err(AppError::BadRequest(format!("Not an investigable url: {:?}", url)));
    }

    // Lazy lifecycle: sweep finished sessions on the create path
    let store = state.orchestrator.store();
    store.sweep(&IdleTtlPolicy::new(state.session_idle_ttl));
    store.sweep(&CapacityPolicy::new(state.session_capacity));

    let session = state.orchestrator.create(&url);
    let session_id = session.id.clone();

    let (sink, rx) = ChannelSink::new();
    let orchestrator = Arc::clone(&state.orchestrator);
    tokio::spawn(async move {
        let _ = orchestrator.run_turn(&session.id, None, &sink).await;
    });

    let mut response = sse_response(rx).into_response();
    if let Ok(header) = session_id.parse() {
        response.headers_mut().insert("x-session-id", header);
    }
    Ok(response)
}

/// POST /investigations/:id/deepen - run a focused follow-up turn
async fn deepen_investigation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<DeepenRequest>,
) -> Result<Response, AppError> {
    let focus = Focus::parse(&request.focus)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid focus: {:?}", request.focus)))?;

    if state.orchestrator.store().get(&session_id).is_none() {
        return Err(AppError::NotFound(format!("Unknown session: {}", session_id)));
    }

    let (sink, rx) = ChannelSink::new();
    let orchestrator = Arc::clone(&state.orchestrator);
    tokio::spawn(async move {
        // Existence was just checked; a lost race surfaces on the stream
        if let Err(e) = orchestrator.deepen(&session_id, focus, &sink).await {
            sink.emit(marlowe_domain::StreamEvent::Error {
                message: e.to_string(),
            });
        }
    });

    Ok(sse_response(rx).into_response())
}

/// POST /products/analyze - search, check, and rank products
async fn analyze_products(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeProductsRequest>,
) -> Result<Response, AppError> {
    let queries: Vec<String> = request
        .queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    if queries.is_empty() {
        return Err(AppError::BadRequest("No usable queries".to_string()));
    }

    let (sink, rx) = ChannelSink::new();
    let task_state = state.clone();
    tokio::spawn(async move {
        run_product_analysis(task_state, queries, Box::new(sink)).await;
    });

    Ok(sse_response(rx).into_response())
}

/// GET /health - liveness and session count
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.orchestrator.store().len(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/investigations", post(start_investigation))
        .route("/investigations/:id/deepen", post(deepen_investigation))
        .route("/products/analyze", post(analyze_products))
        .route("/health", get(health_check))
        .with_state(state)
}
