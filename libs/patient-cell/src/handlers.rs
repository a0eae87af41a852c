use std::sync::Arc;

use axum::{
    extract::{State, Extension},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::access::Actor;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::UpdatePatientRequest;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn get_my_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Actor::from_user(&user)?.patient_id()?;

    let patient = PatientService::new(&config).get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_my_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Actor::from_user(&user)?.patient_id()?;

    let patient = PatientService::new(&config)
        .update_patient(patient_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Profile updated."
    })))
}
