use std::sync::Arc;

use axum::{
    Router,
    routing::{get, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn department_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_departments))
        .route("/{department_id}", get(handlers::get_department_details))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/search", get(handlers::search_doctors))
        .route(
            "/me/availability",
            get(handlers::get_my_availability)
                .post(handlers::set_my_availability)
                .put(handlers::set_my_weekly_availability),
        )
        .route("/me/availability/{availability_id}", delete(handlers::delete_my_availability))
        .route("/{doctor_id}", get(handlers::get_doctor_details))
        .route("/{doctor_id}/availability", get(handlers::check_doctor_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
