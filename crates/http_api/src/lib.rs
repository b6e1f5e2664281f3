mod cookies;
mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use errors::{ErrorBody, HttpError};
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let usage = Router::new()
        .route("/summary", get(handlers::usage_summary))
        .route("/models", get(handlers::usage_models))
        .route("/routes", get(handlers::usage_routes))
        .route("/records", get(handlers::usage_records))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let auth = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::session));

    let api = Router::new()
        .route("/sync", get(handlers::sync).post(handlers::sync))
        .nest("/auth", auth)
        .nest("/usage", usage);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
