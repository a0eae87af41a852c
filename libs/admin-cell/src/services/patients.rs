use tracing::info;

use appointment_cell::models::Treatment;
use appointment_cell::services::TreatmentService;
use auth_cell::services::UserService;
use patient_cell::models::{Patient, UpdatePatientRequest};
use patient_cell::services::PatientService;
use shared_config::AppConfig;

use crate::models::AdminError;

pub struct AdminPatientService {
    users: UserService,
    patients: PatientService,
    treatments: TreatmentService,
}

impl AdminPatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            users: UserService::new(config),
            patients: PatientService::new(config),
            treatments: TreatmentService::new(config),
        }
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, AdminError> {
        Ok(self.patients.list_patients().await?)
    }

    pub async fn edit_patient(&self, patient_id: i64, request: UpdatePatientRequest) -> Result<Patient, AdminError> {
        let patient = self.patients.update_patient(patient_id, request).await?;
        info!("Patient {} updated by admin", patient_id);
        Ok(patient)
    }

    pub async fn patient_treatments(&self, patient_id: i64) -> Result<(Patient, Vec<Treatment>), AdminError> {
        let patient = self.patients.get_patient(patient_id).await?;
        let treatments = self.treatments.treatments_for_patient(patient_id).await?;
        Ok((patient, treatments))
    }

    /// Disables the patient's login. History is kept.
    pub async fn blacklist_patient(&self, patient_id: i64) -> Result<Patient, AdminError> {
        let patient = self.patients.get_patient(patient_id).await?;
        self.users.set_active(patient.user_id, false).await?;
        Ok(patient)
    }
}
