pub mod auth;
pub mod error;
pub mod middleware;
pub mod posts;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use chirp_types::api::HealthResponse;

pub use auth::{AppState, AppStateInner, AuthConfig};
pub use error::ApiError;

/// Assemble the full API router under the /api prefix. Only registration,
/// login, and the health probe skip authentication.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/posts/create", post(posts::create_post))
        .route("/posts/all", get(posts::all_posts))
        .route("/posts/user/{user_id}", get(posts::posts_by_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running!".to_string(),
    })
}
