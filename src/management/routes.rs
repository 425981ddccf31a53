//! Route table.

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use super::handlers::{applications, auth};
use super::middleware::require_auth;
use super::server::AppState;

pub fn create_routes(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .route("/me", get(auth::me))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout));

    let application_routes = Router::new()
        .route("/", post(applications::create).get(applications::list))
        .route("/check", get(applications::check_by_url))
        .route(
            "/{id}",
            put(applications::update).delete(applications::remove),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/applications", application_routes)
        .with_state(state)
}
