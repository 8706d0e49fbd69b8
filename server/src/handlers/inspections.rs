//! Inspection handlers - listing, drafts and saves.

use crate::driver::now_ms;
use crate::error::{AppError, Result};
use crate::AppState;
use fieldcheck_engine::{Inspection, Notification, RecordId, SaveOutcome};
use serde::Serialize;

/// Response for a save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: RecordId,
    /// True if the id was new
    pub created: bool,
    /// False when the save is waiting for a sync
    pub synced: bool,
    pub notification: Notification,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            id: outcome.id,
            created: outcome.created,
            synced: outcome.synced,
            notification: outcome.notification,
        }
    }
}

/// All inspections in display order.
pub async fn handle_list(state: &AppState) -> Vec<Inspection> {
    state.session.lock().await.inspections().to_vec()
}

/// One inspection by id.
pub async fn handle_get(state: &AppState, id: RecordId) -> Result<Inspection> {
    state
        .session
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("inspection {}", id)))
}

/// A blank inspection with a free id.
pub async fn handle_draft(state: &AppState) -> Inspection {
    let now = now_ms();
    state.session.lock().await.new_draft(now)
}

/// Save a new or edited inspection.
///
/// Completed inspections are read-only through the API; the engine itself
/// would accept the edit.
pub async fn handle_save(state: &AppState, inspection: Inspection) -> Result<SaveResponse> {
    let id = inspection.id;
    let mut session = state.session.lock().await;
    if !session.is_editable(id) {
        tracing::info!(record_id = id, "edit of completed inspection refused");
        return Err(AppError::Locked(id));
    }
    let outcome = session.save_inspection(inspection, now_ms());

    // Broadcast before releasing the lock so views go out in mutation order
    state.publish(vec![outcome.notification.clone()], session.view());
    Ok(outcome.into())
}
