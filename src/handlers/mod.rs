//! HTTP handlers for Pair Sentinel

mod health;

pub use health::*;

use crate::metrics::{metrics_router, MetricsState};
use axum::{routing::get, Router};
use std::sync::Arc;

/// `/health` and `/metrics`
pub fn router(state: Arc<AppState>, metrics: Arc<MetricsState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .merge(metrics_router().with_state(metrics))
}
