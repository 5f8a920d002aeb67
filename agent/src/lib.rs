//! Host agent: runs the lifecycle scheduler with the built-in modules and
//! exposes power control over HTTP.

pub mod config;
pub mod handlers;
pub mod hooks;
pub mod middleware;
pub mod modules;
pub mod types;

use axum::{routing::post, Router};
use lifecycle::PowerOrchestrator;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub api_key: String,
    pub orchestrator: Arc<PowerOrchestrator>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/power/invoke", post(handlers::invoke_power))
        .route("/power/abort", post(handlers::abort_power))
        .route("/power/status", post(handlers::power_status))
        .route("/state/updating", post(handlers::set_updating))
        .route("/state/requested", post(handlers::set_requested))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
