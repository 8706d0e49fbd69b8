//! Fieldcheck Server - local host for an offline-first inspection session.
//!
//! This server owns one fieldcheck-engine session, persists it to a data
//! directory, runs its scheduled work on the wall clock, and exposes it over
//! HTTP and WebSocket to the presentation layer.

mod config;
mod driver;
mod error;
mod handlers;
mod routes;
mod storage;
mod websocket;

use crate::config::Config;
use crate::driver::SharedSession;
use crate::storage::{BoxedStorage, FileStorage};
use crate::websocket::ConnectionManager;
use axum::Router;
use fieldcheck_engine::{Notification, Session, SessionView};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub conn_manager: Arc<ConnectionManager>,
    /// Wakes the driver when the session's schedule may have changed
    pub wake: Arc<Notify>,
}

impl AppState {
    pub fn new(session: Session<BoxedStorage>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            conn_manager: ConnectionManager::new_shared(),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Tell clients about a change and let the driver re-read the schedule.
    /// Call while still holding the session lock.
    pub fn publish(&self, notifications: Vec<Notification>, view: SessionView) {
        driver::publish(&self.conn_manager, notifications, view);
        self.wake.notify_one();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fieldcheck_server=debug,fieldcheck_engine=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Fieldcheck Server on {}:{}", config.host, config.port);

    // Open the session over the data directory
    let storage = FileStorage::open(&config.data_dir)?;
    tracing::info!("Session data in {}", storage.dir().display());
    let session = Session::open(
        Box::new(storage) as BoxedStorage,
        config.session.clone(),
        driver::now_ms(),
    )?;
    let state = AppState::new(session);

    // Run scheduled session work in the background
    let driver_handle = tokio::spawn(driver::run(state.clone()));

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state.clone());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    driver_handle.abort();

    // Final write before exit
    tracing::info!("Saving session state...");
    state.session.lock().await.flush()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

#[cfg(test)]
mod test_support {
    use super::*;
    use fieldcheck_engine::{MemoryStorage, SessionConfig};

    /// State over in-memory storage with the event generator off.
    pub fn test_state() -> AppState {
        test_state_with(SessionConfig {
            event_interval_ms: 0,
            ..SessionConfig::default()
        })
    }

    pub fn test_state_with(session_config: SessionConfig) -> AppState {
        let session = Session::open(
            Box::new(MemoryStorage::new()) as BoxedStorage,
            session_config,
            driver::now_ms(),
        )
        .expect("in-memory storage cannot fail");
        AppState::new(session)
    }
}
