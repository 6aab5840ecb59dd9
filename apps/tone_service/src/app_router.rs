use axum::{routing::get, Router};

use crate::{health::health_controller, tone::tone_controller::tone_router};

pub fn application_router() -> Router {
    Router::new()
        .route("/v1/health", get(health_controller::health))
        .merge(tone_router())
}
