//! Notification feed routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use fieldcheck_engine::Notification;

use crate::error::{AppError, Result};
use crate::handlers::notifications;
use crate::AppState;

/// Create notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_handler).delete(clear_handler))
        .route("/notifications/{id}", delete(dismiss_handler))
}

/// GET /notifications - Feed, newest first.
async fn list_handler(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(notifications::handle_list(&state).await)
}

/// DELETE /notifications - Clear the feed.
async fn clear_handler(State(state): State<AppState>) -> StatusCode {
    notifications::handle_clear(&state).await;
    StatusCode::NO_CONTENT
}

/// DELETE /notifications/{id} - Dismiss one entry.
async fn dismiss_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid notification id: {}", id)))?;
    notifications::handle_dismiss(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
