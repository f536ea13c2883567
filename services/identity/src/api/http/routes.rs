//! 路由表

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::api::http::handlers;
use crate::api::http::{AppState, context_middleware, enforce};
use crate::application::guards::Requirement;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics));

    let login_required = Router::new()
        .route("/api/users", get(handlers::find_user_by_email))
        .route_layer(from_fn_with_state(Requirement::RequiresLogin, enforce));

    let admin_required = Router::new()
        .route("/api/users/{id}", get(handlers::get_user))
        .route("/api/admin/grants", post(handlers::grant_admin))
        .route_layer(from_fn_with_state(Requirement::RequiresAdmin, enforce));

    Router::new()
        .merge(public)
        .merge(login_required)
        .merge(admin_required)
        .layer(from_fn_with_state(state.clone(), context_middleware))
        .with_state(state)
}
