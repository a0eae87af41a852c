use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use doctor_cell::models::{Department, DoctorError};
use patient_cell::models::{Patient, PatientError};
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn holds_slot(&self, slot: &SlotRef) -> bool {
        self.doctor_id == slot.doctor_id && self.date == slot.date && self.time_slot == slot.time_slot
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "Booked",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A doctor's named window on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotRef {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub visit_date: NaiveDate,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotCheckQuery {
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedAppointment {
    pub appointment: Appointment,
    pub treatment: Treatment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHistory {
    pub patient: Patient,
    pub appointments: Vec<Appointment>,
    pub treatments: Vec<Treatment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient: Patient,
    pub upcoming: Vec<Appointment>,
    pub departments: Vec<Department>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentHistory {
    pub appointment: Appointment,
    pub treatment: Option<Treatment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("This time slot is already booked for the selected doctor")]
    SlotTaken,

    #[error("Cannot {action} an appointment that is {from}")]
    InvalidStatusTransition { from: AppointmentStatus, action: &'static str },

    #[error("Appointment was modified concurrently, please retry")]
    ConcurrentModification,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::SlotTaken
            | AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::ConcurrentModification => AppError::Conflict(err.to_string()),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppointmentError {
    fn from(err: serde_json::Error) -> Self {
        AppointmentError::DatabaseError(format!("Unexpected row shape: {}", err))
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::Forbidden => AppointmentError::Forbidden(err.to_string()),
            DoctorError::ValidationError(msg) => AppointmentError::ValidationError(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PatientError> for AppointmentError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppointmentError::PatientNotFound,
            PatientError::ValidationError(msg) => AppointmentError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_status_serializes_as_stored() {
        assert_eq!(json!(AppointmentStatus::Cancelled), json!("Cancelled"));
        let status: AppointmentStatus = serde_json::from_value(json!("Booked")).unwrap();
        assert_eq!(status, AppointmentStatus::Booked);
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppointmentError::SlotTaken, StatusCode::CONFLICT),
            (
                AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Completed, action: "cancel" },
                StatusCode::CONFLICT,
            ),
            (AppointmentError::DoctorNotFound, StatusCode::NOT_FOUND),
            (AppointmentError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (AppointmentError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (AppointmentError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_transition_message() {
        let err = AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Completed, action: "reschedule" };
        assert_eq!(err.to_string(), "Cannot reschedule an appointment that is Completed");
    }
}
