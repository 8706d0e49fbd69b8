//! Liveness endpoint with a summary of the session's condition.

use axum::{extract::State, routing::get, Json, Router};
use fieldcheck_engine::StartupSource;
use serde::Serialize;

use crate::AppState;

/// Health response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// How the session's state was obtained at startup
    pub startup: StartupSource,
    pub online: bool,
    pub records: usize,
    /// Records waiting for a sync
    pub pending: usize,
    pub sync_in_flight: bool,
    pub clients: usize,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        startup: session.source(),
        online: session.is_online(),
        records: session.inspections().len(),
        pending: session.pending_ids().len(),
        sync_in_flight: session.in_flight().is_some(),
        clients: state.conn_manager.connection_count(),
    })
}

async fn root() -> &'static str {
    "Fieldcheck Inspection Server"
}
