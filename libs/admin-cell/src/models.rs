use std::str::FromStr;

use serde::{Deserialize, Serialize};

use appointment_cell::models::{Appointment, AppointmentError};
use auth_cell::models::AuthError;
use doctor_cell::models::{Doctor, DoctorError};
use patient_cell::models::{Patient, PatientError};
use shared_models::access::Role;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub doctor_count: usize,
    pub patient_count: usize,
    pub upcoming_appointments: Vec<Appointment>,
    pub recent_completed: Vec<Appointment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub department_id: Option<i64>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedDoctor {
    pub user_id: i64,
    pub email: String,
    pub doctor: Doctor,
}

/// What a cascade delete removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletionSummary {
    pub role: Role,
    pub profile_id: i64,
    pub user_id: i64,
    pub appointments_removed: usize,
    pub treatments_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    Doctor,
    Patient,
}

impl FromStr for SearchTarget {
    type Err = AdminError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "doctor" => Ok(SearchTarget::Doctor),
            "patient" => Ok(SearchTarget::Patient),
            other => Err(AdminError::ValidationError(format!(
                "Unknown search target '{}', expected doctor or patient", other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSearchQuery {
    pub q: Option<String>,
    pub by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "by", content = "results", rename_all = "lowercase")]
pub enum SearchResults {
    Doctor(Vec<Doctor>),
    Patient(Vec<Patient>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Doctor(found) => found.len(),
            SearchResults::Patient(found) => found.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::ValidationError(msg) => AppError::ValidationError(msg),
            AdminError::NotFound(_) => AppError::NotFound(err.to_string()),
            AdminError::Conflict(msg) => AppError::Conflict(msg),
            AdminError::DatabaseError(msg) => AppError::Database(msg),
            AdminError::App(inner) => inner,
        }
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::DatabaseError(err.to_string())
    }
}

impl From<DoctorError> for AdminError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AdminError::NotFound("Doctor"),
            DoctorError::DepartmentNotFound => AdminError::NotFound("Department"),
            other => AdminError::App(other.into()),
        }
    }
}

impl From<PatientError> for AdminError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AdminError::NotFound("Patient"),
            other => AdminError::App(other.into()),
        }
    }
}

impl From<AuthError> for AdminError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotFound => AdminError::NotFound("User"),
            AuthError::EmailTaken => AdminError::Conflict(err.to_string()),
            other => AdminError::App(other.into()),
        }
    }
}

impl From<AppointmentError> for AdminError {
    fn from(err: AppointmentError) -> Self {
        AdminError::App(err.into())
    }
}
