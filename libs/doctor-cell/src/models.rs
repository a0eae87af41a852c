use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use shared_models::error::AppError;

// ==============================================================================
// DEPARTMENTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentDetails {
    pub department: Department,
    pub doctors: Vec<Doctor>,
}

// ==============================================================================
// DOCTORS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub department_id: i64,
    pub name: String,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
}

/// Profile row written once the owning user account exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorProfile {
    pub user_id: i64,
    pub department_id: i64,
    pub name: String,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub department_id: Option<i64>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDetails {
    pub doctor: Doctor,
    pub department: Option<Department>,
    pub availability: Vec<DoctorAvailability>,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPeriod {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorAvailability {
    pub id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub morning_slot: Option<String>,
    pub afternoon_slot: Option<String>,
    pub evening_slot: Option<String>,
}

impl DoctorAvailability {
    /// Declared slot labels for the day, in period order.
    pub fn offered_slots(&self) -> Vec<(SlotPeriod, &str)> {
        [
            (SlotPeriod::Morning, self.morning_slot.as_deref()),
            (SlotPeriod::Afternoon, self.afternoon_slot.as_deref()),
            (SlotPeriod::Evening, self.evening_slot.as_deref()),
        ]
        .into_iter()
        .filter_map(|(period, label)| label.map(|l| (period, l)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.offered_slots().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub date: NaiveDate,
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailabilityRequest {
    pub days: Vec<SetAvailabilityRequest>,
}

/// Slot labels after trimming; blank input means the slot is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotLabels {
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
}

impl SlotLabels {
    pub fn normalize(label: Option<&str>) -> Option<String> {
        label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }

    pub fn from_request(request: &SetAvailabilityRequest) -> Self {
        Self {
            morning: Self::normalize(request.morning.as_deref()),
            afternoon: Self::normalize(request.afternoon.as_deref()),
            evening: Self::normalize(request.evening.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_none() && self.afternoon.is_none() && self.evening.is_none()
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Department not found")]
    DepartmentNotFound,

    #[error("Availability not found")]
    AvailabilityNotFound,

    #[error("Not allowed to modify another doctor's availability")]
    Forbidden,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound
            | DoctorError::DepartmentNotFound
            | DoctorError::AvailabilityNotFound => AppError::NotFound(err.to_string()),
            DoctorError::Forbidden => AppError::Forbidden(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

impl From<anyhow::Error> for DoctorError {
    fn from(err: anyhow::Error) -> Self {
        DoctorError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DoctorError {
    fn from(err: serde_json::Error) -> Self {
        DoctorError::DatabaseError(format!("Unexpected row shape: {}", err))
    }
}
