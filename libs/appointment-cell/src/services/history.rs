use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use doctor_cell::services::DepartmentService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentHistory, AppointmentStatus, PatientDashboard,
    PatientHistory,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::treatment::TreatmentService;

/// Days past today shown on the doctor dashboard.
pub const DOCTOR_DASHBOARD_DAYS: i64 = 7;
pub const RECENT_COMPLETED_LIMIT: usize = 50;

/// Read-side views over appointments and treatments.
pub struct AppointmentHistoryService {
    supabase: Arc<SupabaseClient>,
    booking_service: AppointmentBookingService,
    treatment_service: TreatmentService,
    patient_service: PatientService,
    department_service: DepartmentService,
}

impl AppointmentHistoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            booking_service: AppointmentBookingService::new(config),
            treatment_service: TreatmentService::new(config),
            patient_service: PatientService::new(config),
            department_service: DepartmentService::new(config),
        }
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments: {}", path);
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppointmentError::from))
            .collect()
    }

    pub async fn upcoming_for_patient(&self, patient_id: i64, today: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&date=gte.{}&order=date.asc",
            patient_id, today
        );
        self.fetch_appointments(&path).await
    }

    pub async fn appointments_for_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?patient_id=eq.{}&order=date.desc", patient_id);
        self.fetch_appointments(&path).await
    }

    /// Appointments dated `from` through `from + DOCTOR_DASHBOARD_DAYS`.
    pub async fn doctor_dashboard(&self, doctor_id: i64, from: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let until = from + Duration::days(DOCTOR_DASHBOARD_DAYS);
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=gte.{}&date=lte.{}&order=date.asc",
            doctor_id, from, until
        );
        self.fetch_appointments(&path).await
    }

    pub async fn upcoming_booked(&self, today: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?status=eq.{}&date=gte.{}&order=date.asc",
            AppointmentStatus::Booked, today
        );
        self.fetch_appointments(&path).await
    }

    pub async fn recent_completed(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?status=eq.{}&order=date.desc&limit={}",
            AppointmentStatus::Completed, RECENT_COMPLETED_LIMIT
        );
        self.fetch_appointments(&path).await
    }

    pub async fn patient_dashboard(&self, patient_id: i64, today: NaiveDate) -> Result<PatientDashboard, AppointmentError> {
        let (patient, upcoming, departments) = futures::try_join!(
            async { self.patient_service.get_patient(patient_id).await.map_err(AppointmentError::from) },
            self.upcoming_for_patient(patient_id, today),
            async { self.department_service.list_departments().await.map_err(AppointmentError::from) },
        )?;

        Ok(PatientDashboard { patient, upcoming, departments })
    }

    /// Every appointment of a patient, newest first, with their treatments.
    pub async fn patient_history(&self, patient_id: i64) -> Result<PatientHistory, AppointmentError> {
        let (patient, appointments, treatments) = futures::try_join!(
            async { self.patient_service.get_patient(patient_id).await.map_err(AppointmentError::from) },
            self.appointments_for_patient(patient_id),
            self.treatment_service.treatments_for_patient(patient_id),
        )?;

        Ok(PatientHistory { patient, appointments, treatments })
    }

    pub async fn appointment_history(&self, appointment_id: i64) -> Result<AppointmentHistory, AppointmentError> {
        let appointment = self.booking_service.get_appointment(appointment_id).await?;
        let treatment = self.treatment_service.treatment_for_appointment(appointment_id).await?;

        Ok(AppointmentHistory { appointment, treatment })
    }
}
