//! Route handlers, one module per resource.

pub mod auth;
pub mod docs;
pub mod movies;
pub mod relations;
pub mod reviews;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::state::AppState;

/// Every `/v1` route.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/authorize", post(auth::authorize))
        .route("/auth/log-in", post(auth::log_in))
        .route("/auth/log-out", get(auth::log_out))
        .route("/movies", get(movies::list).post(movies::create))
        .route("/movies/{id}", get(movies::by_id))
        .route("/movies/{id}/reviews", get(reviews::by_movie))
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route("/reviews/{id}", axum::routing::delete(reviews::delete))
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::by_id))
        .route("/users/{id}/reviews", get(reviews::by_user))
        .route("/users/{id}/followers", get(relations::followers))
        .route("/users/{id}/follows", get(relations::follows))
        .route(
            "/users/{id}/followers/{follower_id}",
            post(relations::follow).delete(relations::unfollow),
        )
}

/// Documentation and liveness routes outside `/v1`.
pub fn meta_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(docs::redirect_to_docs))
        .route("/docs", get(docs::swagger_ui))
        .route("/openapi.json", get(docs::openapi))
        .route("/health", get(docs::health))
}
