use tracing::debug;

use auth_cell::services::UserService;
use doctor_cell::services::DoctorService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_models::access::Role;

use crate::models::{AdminError, SearchResults, SearchTarget};

/// Doctor search matches name, department and account email; patient search
/// matches name, contact, id and account email.
pub struct AdminSearchService {
    users: UserService,
    doctors: DoctorService,
    patients: PatientService,
}

impl AdminSearchService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            users: UserService::new(config),
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
        }
    }

    pub async fn search(&self, query: &str, target: SearchTarget) -> Result<SearchResults, AdminError> {
        debug!("Admin search for '{}' in {:?}", query, target);

        Ok(match target {
            SearchTarget::Doctor => {
                let user_ids = self.users.search_ids_by_email(query, Role::Doctor).await?;
                SearchResults::Doctor(self.doctors.search_doctors(query, &user_ids).await?)
            }
            SearchTarget::Patient => {
                let user_ids = self.users.search_ids_by_email(query, Role::Patient).await?;
                SearchResults::Patient(self.patients.search_patients(query, &user_ids).await?)
            }
        })
    }
}
