//! Session driver - runs the session's scheduled work on the wall clock.
//!
//! The engine never sleeps. This task sleeps until the session's next due
//! time (or until a handler changes the schedule), advances the session,
//! and pushes whatever happened to connected clients.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fieldcheck_engine::{clock, Notification, Session, SessionView, Timestamp};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::storage::BoxedStorage;
use crate::websocket::{ConnectionManager, ServerMessage};
use crate::AppState;

/// The one session every handler shares.
pub type SharedSession = Arc<Mutex<Session<BoxedStorage>>>;

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> Timestamp {
    clock::from_datetime(Utc::now())
}

/// Push new notifications, then the resulting state, to every client.
///
/// Callers hold the session lock so that views reach clients in the order
/// the session produced them.
pub fn publish(conn_manager: &ConnectionManager, notifications: Vec<Notification>, view: SessionView) {
    for notification in notifications {
        conn_manager.broadcast_all(ServerMessage::Notification { notification });
    }
    conn_manager.broadcast_all(ServerMessage::StateChanged { state: view });
}

/// Run until aborted.
pub async fn run(state: AppState) {
    let mut rng = StdRng::from_entropy();
    tracing::debug!("session driver started");

    loop {
        let next_due = state.session.lock().await.next_due();
        let wait = next_due.map(|due| Duration::from_millis(due.saturating_sub(now_ms())));

        let sleep = async {
            match wait {
                Some(wait) => tokio::time::sleep(wait).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = sleep => {}
            // Schedule changed; recompute the deadline
            _ = state.wake.notified() => continue,
        }

        let mut session = state.session.lock().await;
        let advance = session.advance(now_ms(), &mut rng);
        if advance.is_empty() {
            continue;
        }

        for report in &advance.completed_syncs {
            tracing::info!(
                ticket = report.ticket,
                synced = report.synced.len(),
                "sync finished"
            );
        }
        publish(&state.conn_manager, advance.notifications, session.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state_with;
    use fieldcheck_engine::SessionConfig;

    #[tokio::test]
    async fn test_driver_completes_sync() {
        let config = SessionConfig {
            sync_latency_ms: 20,
            auto_sync_delay_ms: 10,
            event_interval_ms: 0,
            ..SessionConfig::default()
        };
        let state = test_state_with(config);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        state.conn_manager.register("test".to_string(), tx);

        {
            let mut session = state.session.lock().await;
            session.set_online(false, now_ms());
            let draft = session.new_draft(now_ms());
            session.save_inspection(draft, now_ms());
            session.set_online(true, now_ms());
        }

        let driver = tokio::spawn(run(state.clone()));

        let notification = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(ServerMessage::Notification { notification }) => break notification,
                    Some(_) => continue,
                    None => panic!("channel closed"),
                }
            }
        })
        .await
        .expect("sync should complete");

        assert_eq!(notification.message, "Successfully synced 1 inspection(s)");
        assert!(state.session.lock().await.pending_ids().is_empty());
        driver.abort();
    }

    #[tokio::test]
    async fn test_wake_recomputes_deadline() {
        let config = SessionConfig {
            sync_latency_ms: 10,
            event_interval_ms: 0,
            ..SessionConfig::default()
        };
        let state = test_state_with(config);
        let driver = tokio::spawn(run(state.clone()));

        // Nothing is scheduled yet; the driver waits on the wake signal
        tokio::time::sleep(Duration::from_millis(20)).await;
        {
            let mut session = state.session.lock().await;
            session.set_online(false, now_ms());
            let draft = session.new_draft(now_ms());
            session.save_inspection(draft, now_ms());
            session.set_online(true, now_ms());
            session.request_sync(now_ms()).unwrap();
        }
        state.wake.notify_one();

        tokio::time::timeout(Duration::from_secs(5), async {
            while !state.session.lock().await.pending_ids().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("driver should pick up the new sync");

        driver.abort();
    }
}
