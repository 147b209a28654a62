//! HTTP API server for the Passgate node.
//!
//! Provides REST endpoints for node health, the session snapshot, presenting
//! the request, retrying, prover callback delivery, and the last outcome.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use passgate_core::{PresentableRequest, ProofEvent, VerificationOutcome};
use passgate_session::SessionStatus;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::commands::{CallbackResponse, CommandError, NodeCommand};
use crate::state::NodeState;

// --- Response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub backend_reachable: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<NodeState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        backend_reachable: state.backend_reachable(),
    })
}

async fn handle_session(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<SessionStatus>, ApiError> {
    state
        .status()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "no session has been started"))
}

async fn handle_outcome(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<VerificationOutcome>, ApiError> {
    state
        .last_outcome()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "no outcome yet"))
}

async fn handle_present(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<PresentableRequest>, ApiError> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let cmd = NodeCommand::Present { reply: reply_tx };
    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_retry(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<SessionStatus>, ApiError> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let cmd = NodeCommand::Retry { reply: reply_tx };
    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_callback(
    State(state): State<Arc<NodeState>>,
    Json(event): Json<ProofEvent>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let cmd = NodeCommand::DeliverProof {
        event,
        reply: reply_tx,
    };
    send_command_and_await(&state, cmd, reply_rx).await
}

/// Helper to send a command and await the reply.
async fn send_command_and_await<T: Serialize>(
    state: &Arc<NodeState>,
    cmd: NodeCommand,
    reply_rx: tokio::sync::oneshot::Receiver<Result<T, CommandError>>,
) -> Result<Json<T>, ApiError> {
    state.command_tx.send(cmd).await.map_err(|_| {
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "node event loop not running",
        )
    })?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(e)) => {
            let status = match e {
                CommandError::Conflict(_) => StatusCode::CONFLICT,
                CommandError::Invalid(_) => StatusCode::BAD_REQUEST,
                CommandError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(error(status, e.message()))
        }
        Err(_) => Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "event loop dropped the reply channel",
        )),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/session", get(handle_session))
        .route("/api/v1/session/present", post(handle_present))
        .route("/api/v1/session/retry", post(handle_retry))
        .route("/api/v1/callback", post(handle_callback))
        .route("/api/v1/outcome", get(handle_outcome))
        .with_state(state)
}

pub async fn serve_api(listener: TcpListener, state: Arc<NodeState>) -> anyhow::Result<()> {
    let app = build_router(state);
    tracing::info!(listen_addr = %listener.local_addr()?, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
