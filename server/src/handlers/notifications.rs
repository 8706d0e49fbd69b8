//! Notification feed handlers.

use crate::error::{AppError, Result};
use crate::AppState;
use fieldcheck_engine::{Notification, NotificationId};

/// Feed entries, newest first.
pub async fn handle_list(state: &AppState) -> Vec<Notification> {
    state.session.lock().await.notifications()
}

/// Drop one entry.
pub async fn handle_dismiss(state: &AppState, id: NotificationId) -> Result<()> {
    let mut session = state.session.lock().await;
    if !session.dismiss_notification(id) {
        return Err(AppError::NotFound(format!("notification {}", id)));
    }
    state.publish(Vec::new(), session.view());
    Ok(())
}

/// Empty the feed.
pub async fn handle_clear(state: &AppState) {
    let mut session = state.session.lock().await;
    session.clear_notifications();
    state.publish(Vec::new(), session.view());
}
