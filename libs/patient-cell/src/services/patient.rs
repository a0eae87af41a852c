use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::query::{join_ids, search_term};

use crate::models::{CreatePatientProfile, Patient, PatientError, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient_profile(&self, profile: CreatePatientProfile) -> Result<Patient, PatientError> {
        debug!("Creating patient profile for user {}", profile.user_id);

        let name = profile.name.trim();
        if name.is_empty() {
            return Err(PatientError::ValidationError("Patient name is required".to_string()));
        }

        let rows = self.supabase.request_returning(
            Method::POST,
            "/rest/v1/patients",
            Some(json!({ "user_id": profile.user_id, "name": name })),
        ).await?;

        let row = rows.into_iter().next()
            .ok_or_else(|| PatientError::DatabaseError("Failed to create patient profile".to_string()))?;
        let patient: Patient = serde_json::from_value(row)?;

        info!("Patient profile {} created for user {}", patient.id, patient.user_id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        debug!("Fetching patient {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?user_id=eq.{}", user_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(PatientError::from))
            .transpose()
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        self.fetch_patients("/rest/v1/patients?order=name.asc").await
    }

    pub async fn count_patients(&self) -> Result<usize, PatientError> {
        Ok(self.supabase.count("patients", "").await?)
    }

    pub async fn update_patient(&self, patient_id: i64, request: UpdatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Updating patient {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(age) = request.age {
            if !(0..=150).contains(&age) {
                return Err(PatientError::ValidationError("Age must be between 0 and 150".to_string()));
            }
            update_data.insert("age".to_string(), json!(age));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender.trim()));
        }
        if let Some(contact) = request.contact {
            update_data.insert("contact".to_string(), json!(contact.trim()));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address.trim()));
        }

        if update_data.is_empty() {
            return self.get_patient(patient_id).await;
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows = self.supabase
            .request_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Patients matching `query` by name, contact or numeric id, or whose
    /// account id is listed in `user_ids`. An empty query matches nothing.
    pub async fn search_patients(&self, query: &str, user_ids: &[i64]) -> Result<Vec<Patient>, PatientError> {
        let term = search_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Searching patients for '{}'", term);

        let encoded = urlencoding::encode(&term);
        let mut clauses = vec![
            format!("name.ilike.*{}*", encoded),
            format!("contact.ilike.*{}*", encoded),
        ];
        if let Ok(id) = term.parse::<i64>() {
            clauses.push(format!("id.eq.{}", id));
        }
        if !user_ids.is_empty() {
            clauses.push(format!("user_id.in.({})", join_ids(user_ids)));
        }

        let path = format!("/rest/v1/patients?or=({})&order=name.asc", clauses.join(","));
        self.fetch_patients(&path).await
    }

    async fn fetch_patients(&self, path: &str) -> Result<Vec<Patient>, PatientError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(PatientError::from))
            .collect()
    }
}
