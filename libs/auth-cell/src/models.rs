use serde::{Deserialize, Serialize};

use doctor_cell::models::DoctorError;
use patient_cell::models::PatientError;
use shared_models::access::Role;
use shared_models::error::AppError;

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in_hours: i64,
    pub user: UserAccount,
    pub profile_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("User not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::AccountDisabled => AppError::Forbidden(err.to_string()),
            AuthError::NotFound => AppError::NotFound(err.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::DatabaseError(format!("Unexpected row shape: {}", err))
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Internal(format!("Password hashing failed: {}", err))
    }
}

impl From<PatientError> for AuthError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::ValidationError(msg) => AuthError::ValidationError(msg),
            other => AuthError::DatabaseError(other.to_string()),
        }
    }
}

impl From<DoctorError> for AuthError {
    fn from(err: DoctorError) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}
