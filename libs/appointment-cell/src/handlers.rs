use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::access::{Actor, Role};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    BookAppointmentRequest, CompleteAppointmentRequest, RescheduleAppointmentRequest,
    SlotCheckQuery,
};
use crate::services::{
    AppointmentBookingService, AppointmentHistoryService, AppointmentPolicy, TreatmentService,
};

// ==============================================================================
// BOOKING AND LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = Actor::from_user(&user)?;
    let patient_id = AppointmentPolicy::booking_patient(&actor)?;

    let appointment = AppointmentBookingService::new(&state)
        .book_appointment(patient_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn check_slot(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SlotCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let taken = AppointmentBookingService::new(&state).check_slot(query).await?;

    Ok(Json(json!({
        "taken": taken,
        "available": !taken
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_user(&user)?;

    let appointment = AppointmentBookingService::new(&state)
        .view_appointment(appointment_id, &actor)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_user(&user)?;

    let appointment = AppointmentBookingService::new(&state)
        .cancel_appointment(appointment_id, &actor)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_user(&user)?;

    let appointment = AppointmentBookingService::new(&state)
        .reschedule_appointment(appointment_id, &actor, request)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_user(&user)?;
    let today = Utc::now().date_naive();

    let completed = TreatmentService::new(&state)
        .complete_appointment(appointment_id, &actor, request, today)
        .await?;

    Ok(Json(json!(completed)))
}

/// Admin view of one appointment and its treatment.
#[axum::debug_handler]
pub async fn get_appointment_history(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    Actor::from_user(&user)?.require(Role::Admin)?;

    let history = AppointmentHistoryService::new(&state)
        .appointment_history(appointment_id)
        .await?;

    Ok(Json(json!(history)))
}

// ==============================================================================
// DASHBOARDS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_patient_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Actor::from_user(&user)?.patient_id()?;
    let today = Utc::now().date_naive();

    let dashboard = AppointmentHistoryService::new(&state)
        .patient_dashboard(patient_id, today)
        .await?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn get_patient_history(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Actor::from_user(&user)?.patient_id()?;

    let history = AppointmentHistoryService::new(&state)
        .patient_history(patient_id)
        .await?;

    Ok(Json(json!(history)))
}

#[axum::debug_handler]
pub async fn get_doctor_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Actor::from_user(&user)?.doctor_id()?;
    let today = Utc::now().date_naive();

    let appointments = AppointmentHistoryService::new(&state)
        .doctor_dashboard(doctor_id, today)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
        "today": today
    })))
}

#[axum::debug_handler]
pub async fn get_patient_history_for_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    Actor::from_user(&user)?.doctor_id()?;

    let history = AppointmentHistoryService::new(&state)
        .patient_history(patient_id)
        .await?;

    Ok(Json(json!(history)))
}
