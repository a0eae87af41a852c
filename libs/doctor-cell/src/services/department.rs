use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Department, DepartmentDetails, DoctorError};
use crate::services::doctor::DoctorService;

pub struct DepartmentService {
    supabase: SupabaseClient,
    doctors: DoctorService,
}

impl DepartmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
        }
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, DoctorError> {
        debug!("Listing departments");

        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/departments?order=name.asc",
            None,
        ).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DoctorError::from))
            .collect()
    }

    pub async fn get_department(&self, department_id: i64) -> Result<Department, DoctorError> {
        let path = format!("/rest/v1/departments?id=eq.{}", department_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let row = rows.into_iter().next().ok_or(DoctorError::DepartmentNotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Department with its doctors ordered by name.
    pub async fn department_details(&self, department_id: i64) -> Result<DepartmentDetails, DoctorError> {
        let department = self.get_department(department_id).await?;
        let doctors = self.doctors.list_by_department(department_id).await?;

        Ok(DepartmentDetails { department, doctors })
    }
}
