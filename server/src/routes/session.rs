//! Session routes - state, sync and connectivity.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use fieldcheck_engine::{SessionConfig, SessionView, SyncRequest};

use crate::error::Result;
use crate::handlers::{session, ConnectivityRequest, ConnectivityResponse};
use crate::AppState;

/// Create session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(state_handler))
        .route("/config", get(config_handler))
        .route("/sync", post(sync_handler))
        .route("/connectivity", put(set_online_handler))
        .route("/connectivity/toggle", post(toggle_handler))
}

/// GET /state - Everything the presentation layer renders.
async fn state_handler(State(state): State<AppState>) -> Json<SessionView> {
    Json(session::handle_state(&state).await)
}

/// GET /config - Session timings in effect.
async fn config_handler(State(state): State<AppState>) -> Json<SessionConfig> {
    Json(state.session.lock().await.config().clone())
}

/// POST /sync - Sync everything pending.
async fn sync_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SyncRequest>)> {
    let result = session::handle_sync(&state).await?;
    let status = match result {
        SyncRequest::Started { .. } => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(result)))
}

/// PUT /connectivity - Environment online/offline signal.
async fn set_online_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConnectivityRequest>, JsonRejection>,
) -> Result<Json<ConnectivityResponse>> {
    let Json(request) = payload?;
    Ok(Json(session::handle_set_online(&state, request.online).await))
}

/// POST /connectivity/toggle - Flip connectivity.
async fn toggle_handler(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    Json(session::handle_toggle_online(&state).await)
}
