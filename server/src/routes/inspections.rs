//! Inspection routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fieldcheck_engine::Inspection;

use crate::error::{AppError, Result};
use crate::handlers::{inspections, SaveResponse};
use crate::AppState;

/// Create inspection routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inspections", get(list_handler).post(save_handler))
        .route("/inspections/draft", get(draft_handler))
        .route("/inspections/{id}", get(get_handler))
}

/// GET /inspections - All inspections in display order.
async fn list_handler(State(state): State<AppState>) -> Json<Vec<Inspection>> {
    Json(inspections::handle_list(&state).await)
}

/// GET /inspections/{id} - One inspection.
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Inspection>> {
    let id = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid inspection id: {}", id)))?;
    Ok(Json(inspections::handle_get(&state, id).await?))
}

/// GET /inspections/draft - Blank inspection for the new-inspection form.
async fn draft_handler(State(state): State<AppState>) -> Json<Inspection> {
    Json(inspections::handle_draft(&state).await)
}

/// POST /inspections - Save a new or edited inspection.
async fn save_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Inspection>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveResponse>)> {
    let Json(inspection) = payload?;
    let response = inspections::handle_save(&state, inspection).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}
