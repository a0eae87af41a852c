//! Removal of doctor and patient accounts.
//!
//! The schema cascades a deleted `users` row to its profile, the profile's
//! appointments and their treatments, so removal is a single delete of the
//! account. Dependent rows are counted first for the returned summary.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use auth_cell::services::UserService;
use doctor_cell::services::DoctorService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::access::Role;
use shared_utils::query::join_ids;

use crate::models::{AdminError, DeletionSummary};

pub struct AccountRemovalService {
    supabase: SupabaseClient,
    users: UserService,
    doctors: DoctorService,
    patients: PatientService,
}

impl AccountRemovalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            users: UserService::new(config),
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
        }
    }

    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<DeletionSummary, AdminError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;

        let appointment_ids = self.appointment_ids("doctor_id", doctor_id).await?;
        let treatments_removed = if appointment_ids.is_empty() {
            0
        } else {
            let filter = format!("appointment_id=in.({})", join_ids(&appointment_ids));
            self.supabase.count("treatments", &filter).await?
        };

        self.users.delete_user(doctor.user_id).await?;

        let summary = DeletionSummary {
            role: Role::Doctor,
            profile_id: doctor.id,
            user_id: doctor.user_id,
            appointments_removed: appointment_ids.len(),
            treatments_removed,
        };
        info!(
            "Doctor {} deleted with {} appointments and {} treatments",
            doctor_id, summary.appointments_removed, summary.treatments_removed
        );
        Ok(summary)
    }

    pub async fn delete_patient(&self, patient_id: i64) -> Result<DeletionSummary, AdminError> {
        let patient = self.patients.get_patient(patient_id).await?;

        let appointment_ids = self.appointment_ids("patient_id", patient_id).await?;
        let treatments_removed = self.supabase
            .count("treatments", &format!("patient_id=eq.{}", patient_id))
            .await?;

        self.users.delete_user(patient.user_id).await?;

        let summary = DeletionSummary {
            role: Role::Patient,
            profile_id: patient.id,
            user_id: patient.user_id,
            appointments_removed: appointment_ids.len(),
            treatments_removed,
        };
        info!(
            "Patient {} deleted with {} appointments and {} treatments",
            patient_id, summary.appointments_removed, summary.treatments_removed
        );
        Ok(summary)
    }

    async fn appointment_ids(&self, column: &str, id: i64) -> Result<Vec<i64>, AdminError> {
        debug!("Collecting appointments with {}={}", column, id);

        let path = format!("/rest/v1/appointments?select=id&{}=eq.{}", column, id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.iter().filter_map(|r| r["id"].as_i64()).collect())
    }
}
