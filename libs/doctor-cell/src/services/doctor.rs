use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_utils::query::{join_ids, search_term};

use crate::models::{
    CreateDoctorProfile, Department, Doctor, DoctorDetails, DoctorError, UpdateDoctorRequest,
};
use crate::services::availability::AvailabilityService;

pub struct DoctorService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    pub async fn create_doctor_profile(&self, profile: CreateDoctorProfile) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for user {}", profile.user_id);

        if profile.name.trim().is_empty() {
            return Err(DoctorError::ValidationError("Doctor name is required".to_string()));
        }

        let body = json!({
            "user_id": profile.user_id,
            "department_id": profile.department_id,
            "name": profile.name.trim(),
            "experience_years": profile.experience_years,
            "bio": profile.bio,
        });

        let rows = self.supabase
            .request_returning(Method::POST, "/rest/v1/doctors", Some(body))
            .await
            .map_err(|e| match SupabaseError::from_anyhow(&e) {
                Some(err) if err.is_foreign_key_violation() => DoctorError::DepartmentNotFound,
                _ => DoctorError::from(e),
            })?;

        let row = rows.into_iter().next()
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor profile".to_string()))?;
        let doctor: Doctor = serde_json::from_value(row)?;

        info!("Doctor profile {} created for user {}", doctor.id, doctor.user_id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(DoctorError::from))
            .transpose()
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        self.fetch_doctors("/rest/v1/doctors?order=name.asc").await
    }

    pub async fn list_by_department(&self, department_id: i64) -> Result<Vec<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?department_id=eq.{}&order=name.asc", department_id);
        self.fetch_doctors(&path).await
    }

    pub async fn count_doctors(&self) -> Result<usize, DoctorError> {
        Ok(self.supabase.count("doctors", "").await?)
    }

    /// Doctor profile, department and every declared availability date.
    pub async fn doctor_details(&self, doctor_id: i64) -> Result<DoctorDetails, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;

        let path = format!("/rest/v1/departments?id=eq.{}", doctor.department_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        let department: Option<Department> = rows.into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?;

        let availability = self.availability.list_for_doctor(doctor_id).await?;

        Ok(DoctorDetails { doctor, department, availability })
    }

    pub async fn update_doctor(&self, doctor_id: i64, request: UpdateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor {}", doctor_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(department_id) = request.department_id {
            update_data.insert("department_id".to_string(), json!(department_id));
        }
        if let Some(experience_years) = request.experience_years {
            if experience_years < 0 {
                return Err(DoctorError::ValidationError(
                    "Experience years cannot be negative".to_string(),
                ));
            }
            update_data.insert("experience_years".to_string(), json!(experience_years));
        }
        if let Some(bio) = request.bio {
            update_data.insert("bio".to_string(), json!(bio.trim()));
        }

        if update_data.is_empty() {
            return self.get_doctor(doctor_id).await;
        }

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let rows = self.supabase
            .request_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| match SupabaseError::from_anyhow(&e) {
                Some(err) if err.is_foreign_key_violation() => DoctorError::DepartmentNotFound,
                _ => DoctorError::from(e),
            })?;

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Doctors whose name or department name contains `query`, or whose
    /// account id is listed in `user_ids`. An empty query matches nothing.
    pub async fn search_doctors(&self, query: &str, user_ids: &[i64]) -> Result<Vec<Doctor>, DoctorError> {
        let term = search_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Searching doctors for '{}'", term);

        let encoded = urlencoding::encode(&term);
        let department_path = format!("/rest/v1/departments?select=id&name=ilike.*{}*", encoded);
        let departments: Vec<Value> = self.supabase.request(Method::GET, &department_path, None).await?;
        let department_ids: Vec<i64> = departments.iter().filter_map(|r| r["id"].as_i64()).collect();

        let mut clauses = vec![format!("name.ilike.*{}*", encoded)];
        if !department_ids.is_empty() {
            clauses.push(format!("department_id.in.({})", join_ids(&department_ids)));
        }
        if !user_ids.is_empty() {
            clauses.push(format!("user_id.in.({})", join_ids(user_ids)));
        }

        let path = format!("/rest/v1/doctors?or=({})&order=name.asc", clauses.join(","));
        self.fetch_doctors(&path).await
    }

    async fn fetch_doctors(&self, path: &str) -> Result<Vec<Doctor>, DoctorError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DoctorError::from))
            .collect()
    }
}
