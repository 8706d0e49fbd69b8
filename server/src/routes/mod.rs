//! HTTP route definitions.

mod health;
mod inspections;
mod notifications;
mod session;
mod ws;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(inspections::routes())
        .merge(session::routes())
        .merge(notifications::routes())
        .merge(ws::routes())
}
