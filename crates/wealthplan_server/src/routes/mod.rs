use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::handlers;

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "wealthplan API server" }))
        .route(
            "/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route("/clients/{id}", get(handlers::get_client))
}

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/events/{id}",
            get(handlers::get_event)
                .patch(handlers::update_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
}

pub fn goal_routes() -> Router<AppState> {
    Router::new().route("/goals", get(handlers::list_goals).post(handlers::create_goal))
}

pub fn portfolio_routes() -> Router<AppState> {
    Router::new().route(
        "/portfolios",
        get(handlers::list_snapshots).post(handlers::create_snapshot),
    )
}

pub fn projection_routes() -> Router<AppState> {
    Router::new().route("/clients/{id}/projection", get(handlers::get_projection))
}

pub fn simulation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clients/{id}/simulations",
            get(handlers::list_simulations).post(handlers::create_simulation),
        )
        .route("/simulations/{id}", get(handlers::get_simulation))
        .route("/simulate", post(handlers::simulate))
}

pub fn advisory_routes() -> Router<AppState> {
    Router::new()
        .route("/clients/{id}/alignment", get(handlers::get_alignment))
        .route("/clients/{id}/suggestions", get(handlers::get_suggestions))
}
