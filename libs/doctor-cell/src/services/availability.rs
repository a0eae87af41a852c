use chrono::{Duration, NaiveDate};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorAvailability, DoctorError, SetAvailabilityRequest, SlotLabels};

/// Days shown when a patient checks upcoming availability.
pub const AVAILABILITY_CHECK_DAYS: i64 = 7;
/// Days of saved availability shown to the doctor.
pub const SAVED_AVAILABILITY_DAYS: i64 = 30;
/// Dates accepted in one weekly update.
pub const MAX_DAYS_PER_UPDATE: usize = 7;

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Upserts the (doctor, date) row. Blank labels clear their slot; when no
    /// row exists and every label is blank nothing is written.
    pub async fn set_availability(
        &self,
        doctor_id: i64,
        request: &SetAvailabilityRequest,
    ) -> Result<Option<DoctorAvailability>, DoctorError> {
        let labels = SlotLabels::from_request(request);
        debug!("Setting availability for doctor {} on {}", doctor_id, request.date);

        let body = json!({
            "doctor_id": doctor_id,
            "date": request.date.format("%Y-%m-%d").to_string(),
            "morning_slot": labels.morning,
            "afternoon_slot": labels.afternoon,
            "evening_slot": labels.evening,
        });

        if labels.is_empty() {
            // Clearing only touches an existing row.
            let path = format!(
                "/rest/v1/doctor_availability?doctor_id=eq.{}&date=eq.{}",
                doctor_id,
                request.date.format("%Y-%m-%d")
            );
            let rows = self.supabase.request_returning(Method::PATCH, &path, Some(body)).await?;

            return rows.into_iter()
                .next()
                .map(|row| serde_json::from_value(row).map_err(DoctorError::from))
                .transpose();
        }

        let row = self.supabase.upsert("doctor_availability", "doctor_id,date", body).await?;
        Ok(Some(serde_json::from_value(row)?))
    }

    /// Applies up to a week of per-date updates, returning the rows that exist afterwards.
    pub async fn set_weekly_availability(
        &self,
        doctor_id: i64,
        days: &[SetAvailabilityRequest],
    ) -> Result<Vec<DoctorAvailability>, DoctorError> {
        if days.len() > MAX_DAYS_PER_UPDATE {
            return Err(DoctorError::ValidationError(format!(
                "At most {} dates can be updated at once", MAX_DAYS_PER_UPDATE
            )));
        }

        let mut saved = Vec::with_capacity(days.len());
        for day in days {
            if let Some(row) = self.set_availability(doctor_id, day).await? {
                saved.push(row);
            }
        }

        info!("Availability updated for doctor {} ({} dates)", doctor_id, saved.len());
        Ok(saved)
    }

    pub async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<DoctorAvailability>, DoctorError> {
        let path = format!("/rest/v1/doctor_availability?doctor_id=eq.{}&order=date.asc", doctor_id);
        self.fetch(&path).await
    }

    /// Rows dated within `[from, from + days]`.
    pub async fn list_window(
        &self,
        doctor_id: i64,
        from: NaiveDate,
        days: i64,
    ) -> Result<Vec<DoctorAvailability>, DoctorError> {
        let until = from + Duration::days(days);
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&date=gte.{}&date=lte.{}&order=date.asc",
            doctor_id,
            from.format("%Y-%m-%d"),
            until.format("%Y-%m-%d"),
        );
        self.fetch(&path).await
    }

    pub async fn delete_availability(&self, doctor_id: i64, availability_id: i64) -> Result<(), DoctorError> {
        let path = format!("/rest/v1/doctor_availability?id=eq.{}", availability_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let row = rows.into_iter().next().ok_or(DoctorError::AvailabilityNotFound)?;
        let availability: DoctorAvailability = serde_json::from_value(row)?;

        if availability.doctor_id != doctor_id {
            warn!("Doctor {} tried to delete availability {} owned by {}",
                  doctor_id, availability_id, availability.doctor_id);
            return Err(DoctorError::Forbidden);
        }

        self.supabase.request_returning(Method::DELETE, &path, None).await?;
        info!("Availability {} deleted", availability_id);
        Ok(())
    }

    async fn fetch(&self, path: &str) -> Result<Vec<DoctorAvailability>, DoctorError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DoctorError::from))
            .collect()
    }
}
