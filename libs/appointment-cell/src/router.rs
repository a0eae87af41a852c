use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, patch},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/slots/check", get(handlers::check_slot))
        .route("/patient/dashboard", get(handlers::get_patient_dashboard))
        .route("/patient/history", get(handlers::get_patient_history))
        .route("/doctor/dashboard", get(handlers::get_doctor_dashboard))
        .route("/doctor/patients/{patient_id}/history", get(handlers::get_patient_history_for_doctor))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/history", get(handlers::get_appointment_history))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
