use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::ApiState;

/// Slack on top of the collection deadline before the HTTP layer gives up.
const SCRAPE_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

pub fn create_router(state: Arc<ApiState>) -> Router {
    let scrape_timeout = state.config.fetch_timeout() + SCRAPE_TIMEOUT_MARGIN;
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(scrape_timeout));

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(middleware)
}
