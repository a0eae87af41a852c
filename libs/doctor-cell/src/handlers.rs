use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::access::{Actor, Role};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{SetAvailabilityRequest, WeeklyAvailabilityRequest};
use crate::services::availability::{AVAILABILITY_CHECK_DAYS, SAVED_AVAILABILITY_DAYS};
use crate::services::{AvailabilityService, DepartmentService, DoctorService};

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub q: Option<String>,
}

// ==============================================================================
// DEPARTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let departments = DepartmentService::new(&state).list_departments().await?;

    Ok(Json(json!({
        "departments": departments,
        "total": departments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_department_details(
    State(state): State<Arc<AppConfig>>,
    Path(department_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let details = DepartmentService::new(&state).department_details(department_id).await?;
    Ok(Json(json!(details)))
}

// ==============================================================================
// DOCTORS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    Actor::from_user(&user)?.require(Role::Patient)?;

    let q = query.q.unwrap_or_default();
    let doctors = DoctorService::new(&state).search_doctors(&q, &[]).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len(),
        "query": q.trim().to_lowercase()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_details(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let details = DoctorService::new(&state).doctor_details(doctor_id).await?;
    Ok(Json(json!(details)))
}

/// Availability over the coming week.
#[axum::debug_handler]
pub async fn check_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state).get_doctor(doctor_id).await?;
    let today = Utc::now().date_naive();

    let availability = AvailabilityService::new(&state)
        .list_window(doctor_id, today, AVAILABILITY_CHECK_DAYS)
        .await?;

    Ok(Json(json!({
        "doctor": doctor,
        "availability": availability,
        "today": today
    })))
}

// ==============================================================================
// DOCTOR SELF-SERVICE AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_my_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Actor::from_user(&user)?.doctor_id()?;
    let today = Utc::now().date_naive();

    let availability = AvailabilityService::new(&state)
        .list_window(doctor_id, today, SAVED_AVAILABILITY_DAYS)
        .await?;

    Ok(Json(json!({
        "availability": availability,
        "today": today
    })))
}

#[axum::debug_handler]
pub async fn set_my_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Actor::from_user(&user)?.doctor_id()?;

    let availability = AvailabilityService::new(&state)
        .set_availability(doctor_id, &request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "availability": availability,
        "message": "Availability updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn set_my_weekly_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<WeeklyAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Actor::from_user(&user)?.doctor_id()?;

    let saved = AvailabilityService::new(&state)
        .set_weekly_availability(doctor_id, &request.days)
        .await?;

    Ok(Json(json!({
        "success": true,
        "availability": saved,
        "message": "Availability updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn delete_my_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(availability_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Actor::from_user(&user)?.doctor_id()?;

    AvailabilityService::new(&state)
        .delete_availability(doctor_id, availability_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability deleted successfully"
    })))
}
