use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Traders
        .route("/api/traders/leaderboard", get(handlers::traders::leaderboard))
        .route("/api/traders/:address", get(handlers::traders::detail))
        .route("/api/traders/:address/positions", get(handlers::traders::positions))
        // Positions
        .route("/api/positions", get(handlers::positions::list))
        // Alerts
        .route("/api/alerts", get(handlers::alerts::recent));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
