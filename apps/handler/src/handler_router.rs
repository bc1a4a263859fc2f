use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, USERS_PATH};
use crate::middleware;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/events", post(handlers::event_handler))
        .route(USERS_PATH, get(handlers::users_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_shared_secret,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
