use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use doctor_cell::models::UpdateDoctorRequest;
use patient_cell::models::UpdatePatientRequest;
use shared_config::AppConfig;
use shared_models::access::{Actor, Role};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AddDoctorRequest, AdminSearchQuery, SearchTarget};
use crate::services::{
    AccountRemovalService, AdminDashboardService, AdminDoctorService, AdminPatientService,
    AdminSearchService,
};

fn require_admin(user: &User) -> Result<Actor, AppError> {
    let actor = Actor::from_user(user)?;
    actor.require(Role::Admin)?;
    Ok(actor)
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let today = Utc::now().date_naive();

    let dashboard = AdminDashboardService::new(&state).dashboard(today).await?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn search(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<AdminSearchQuery>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let target: SearchTarget = query.by.as_deref().unwrap_or_default().parse()?;
    let q = query.q.unwrap_or_default();
    let results = AdminSearchService::new(&state).search(&q, target).await?;

    Ok(Json(json!({
        "query": q.trim(),
        "total": results.len(),
        "search": results
    })))
}

// ==============================================================================
// DOCTORS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let doctors = AdminDoctorService::new(&state).list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<AddDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;

    let created = AdminDoctorService::new(&state).add_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!(created))))
}

#[axum::debug_handler]
pub async fn edit_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let doctor = AdminDoctorService::new(&state).edit_doctor(doctor_id, request).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let summary = AccountRemovalService::new(&state).delete_doctor(doctor_id).await?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
pub async fn blacklist_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let doctor = AdminDoctorService::new(&state).blacklist_doctor(doctor_id).await?;

    Ok(Json(json!({
        "doctor": doctor,
        "blacklisted": true
    })))
}

// ==============================================================================
// PATIENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let patients = AdminPatientService::new(&state).list_patients().await?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn edit_patient(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let patient = AdminPatientService::new(&state).edit_patient(patient_id, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient_treatments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let (patient, treatments) = AdminPatientService::new(&state)
        .patient_treatments(patient_id)
        .await?;

    Ok(Json(json!({
        "patient": patient,
        "treatments": treatments
    })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let summary = AccountRemovalService::new(&state).delete_patient(patient_id).await?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
pub async fn blacklist_patient(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let patient = AdminPatientService::new(&state).blacklist_patient(patient_id).await?;

    Ok(Json(json!({
        "patient": patient,
        "blacklisted": true
    })))
}
