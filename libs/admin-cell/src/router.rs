use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/search", get(handlers::search))
        .route("/doctors", get(handlers::list_doctors).post(handlers::add_doctor))
        .route("/doctors/{doctor_id}", put(handlers::edit_doctor).delete(handlers::delete_doctor))
        .route("/doctors/{doctor_id}/blacklist", post(handlers::blacklist_doctor))
        .route("/patients", get(handlers::list_patients))
        .route("/patients/{patient_id}", put(handlers::edit_patient).delete(handlers::delete_patient))
        .route("/patients/{patient_id}/treatments", get(handlers::get_patient_treatments))
        .route("/patients/{patient_id}/blacklist", post(handlers::blacklist_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
