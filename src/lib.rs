use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod store;

pub use state::AppState;

/// Build the application router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/drinks",
            get(handlers::drinks::list_drinks).post(handlers::drinks::create_drink),
        )
        .route("/drinks-detail", get(handlers::drinks::list_drinks_detail))
        .route(
            "/drinks/:id",
            patch(handlers::drinks::update_drink).delete(handlers::drinks::delete_drink),
        )
        .route("/health", get(handlers::health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
