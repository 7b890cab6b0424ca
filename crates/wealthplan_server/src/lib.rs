//! HTTP surface and SQLite storage for the wealthplan advisory engine

use std::sync::Arc;

use axum::{Router, extract::FromRef};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use wealthplan_core::EngineDefaults;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod routes;
pub mod validation;

pub use db::DbConn;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub defaults: Arc<EngineDefaults>,
}

impl FromRef<AppState> for DbConn {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<EngineDefaults> {
    fn from_ref(state: &AppState) -> Self {
        state.defaults.clone()
    }
}

/// Build the full application router
pub fn app(db: DbConn, defaults: EngineDefaults) -> Router {
    let state = AppState {
        db,
        defaults: Arc::new(defaults),
    };

    Router::new()
        .merge(routes::client_routes())
        .merge(routes::event_routes())
        .merge(routes::goal_routes())
        .merge(routes::portfolio_routes())
        .merge(routes::projection_routes())
        .merge(routes::simulation_routes())
        .merge(routes::advisory_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
