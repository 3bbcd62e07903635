mod error;
mod middleware;
mod state;
mod util;

pub mod docs;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use middleware::logging_middleware;
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        // Subscription routes
        .route("/subscribe", post(routes::subscriptions::subscribe))
        .route("/unsubscribe", post(routes::subscriptions::unsubscribe))
        .route("/preferences", post(routes::subscriptions::update_preferences))
        .route("/stats", get(routes::subscriptions::stats))
        .route("/notifications", get(routes::notifications::list_notifications))
        // Token routes
        .route("/token", post(routes::auth::login))
        .route("/get-token", get(routes::auth::current_token))
        .with_state(state)
        .layer(cors_layer())
        .layer(axum_middleware::from_fn(logging_middleware))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
