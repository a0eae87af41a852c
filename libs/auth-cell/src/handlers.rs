use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{json, Value};
use tracing::debug;

use doctor_cell::services::DoctorService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_models::access::{Actor, Role};
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token as decode_token;

use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::services::{AuthService, UserService};

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (user, patient) = AuthService::new(&config).register(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "user": user,
        "patient": patient,
        "message": "Registration successful, please log in"
    }))))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::new(&config).login(request).await?;
    Ok(Json(response))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let user = decode_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;
    let valid = decode_token(token, &config.jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

/// The caller's account and, for doctors and patients, their profile.
#[axum::debug_handler]
pub async fn me(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_user(&user)?;
    let account = UserService::new(&config).get_user(actor.user_id).await?;

    let profile = match actor.role {
        Role::Admin => Value::Null,
        Role::Doctor => json!(DoctorService::new(&config).get_doctor(actor.doctor_id()?).await?),
        Role::Patient => json!(PatientService::new(&config).get_patient(actor.patient_id()?).await?),
    };

    Ok(Json(json!({
        "user": account,
        "role": actor.role,
        "profile": profile
    })))
}
