//! Session-wide handlers - state, sync and connectivity.

use chrono::{DateTime, Utc};
use fieldcheck_engine::{clock, ConnectivityChange, SessionView, SyncRequest, SyncTicket};
use serde::{Deserialize, Serialize};

use crate::driver::now_ms;
use crate::error::Result;
use crate::AppState;

/// Request body for setting connectivity.
#[derive(Debug, Deserialize)]
pub struct ConnectivityRequest {
    pub online: bool,
}

/// Response for a connectivity change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityResponse {
    pub online: bool,
    /// False if the flag already had the requested value
    pub changed: bool,
    /// When the automatic sync will run, if one was scheduled
    pub auto_sync_at: Option<DateTime<Utc>>,
    /// Sync dropped by going offline
    pub cancelled_sync: Option<SyncTicket>,
}

impl From<ConnectivityChange> for ConnectivityResponse {
    fn from(change: ConnectivityChange) -> Self {
        Self {
            online: change.online,
            changed: change.changed,
            auto_sync_at: change.auto_sync_at.map(clock::to_datetime),
            cancelled_sync: change.cancelled_sync,
        }
    }
}

/// Full session state.
pub async fn handle_state(state: &AppState) -> SessionView {
    state.session.lock().await.view()
}

/// Start a sync of everything pending.
pub async fn handle_sync(state: &AppState) -> Result<SyncRequest> {
    let mut session = state.session.lock().await;
    let result = session.request_sync(now_ms())?;
    if matches!(result, SyncRequest::Started { .. }) {
        state.publish(Vec::new(), session.view());
    }
    Ok(result)
}

/// Set connectivity from an environment signal.
pub async fn handle_set_online(state: &AppState, online: bool) -> ConnectivityResponse {
    let mut session = state.session.lock().await;
    let change = session.set_online(online, now_ms());
    if change.changed {
        state.publish(Vec::new(), session.view());
    }
    change.into()
}

/// Flip connectivity.
pub async fn handle_toggle_online(state: &AppState) -> ConnectivityResponse {
    let mut session = state.session.lock().await;
    let change = session.toggle_online(now_ms());
    state.publish(Vec::new(), session.view());
    change.into()
}
