//! HTTP API module
//!
//! This module contains the routes a rendering client uses to read and drive the timer.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::tasks::CountdownDriver;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(driver: Arc<CountdownDriver>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/events", get(events_handler))
        .route("/timer/controls", post(controls_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/cancel", post(cancel_handler))
        .route("/timer/:field/:direction", post(adjust_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(driver)
}
