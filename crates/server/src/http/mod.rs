use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::trace::TraceLayer;

use crate::{routes, state::AppState};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::projects::router())
        .merge(routes::boards::router())
        .merge(routes::cards::router())
        .merge(routes::labels::router())
        .merge(routes::invites::router())
        .merge(routes::daily_updates::router())
        .layer(from_fn_with_state(state.clone(), auth::require_actor));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
