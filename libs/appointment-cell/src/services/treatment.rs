use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::access::Actor;

use crate::models::{
    AppointmentError, CompleteAppointmentRequest, CompletedAppointment, Treatment,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::lifecycle::{AppointmentAction, AppointmentLifecycleService, Transition};
use crate::services::policy::AppointmentPolicy;

pub struct TreatmentService {
    supabase: Arc<SupabaseClient>,
    booking_service: AppointmentBookingService,
    lifecycle_service: AppointmentLifecycleService,
}

fn clean(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TreatmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            booking_service: AppointmentBookingService::new(config),
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    /// Records the visit outcome and marks the appointment Completed.
    /// Re-completing overwrites the single treatment row for the appointment.
    pub async fn complete_appointment(
        &self,
        appointment_id: i64,
        actor: &Actor,
        request: CompleteAppointmentRequest,
        visit_date: NaiveDate,
    ) -> Result<CompletedAppointment, AppointmentError> {
        let appointment = self.booking_service.get_appointment(appointment_id).await?;
        AppointmentPolicy::can_complete(actor, &appointment)?;

        let status = match self.lifecycle_service.transition(appointment.status, AppointmentAction::Complete)? {
            Transition::Apply(status) => status,
            Transition::NoOp => appointment.status,
        };

        let body = json!({
            "appointment_id": appointment.id,
            "patient_id": appointment.patient_id,
            "diagnosis": clean(request.diagnosis),
            "prescription": clean(request.prescription),
            "notes": clean(request.notes),
            "visit_date": visit_date,
        });
        let row = self.supabase.upsert("treatments", "appointment_id", body).await?;
        let treatment: Treatment = serde_json::from_value(row)?;

        let appointment = if appointment.status == status {
            debug!("Amending treatment {} for appointment {}", treatment.id, appointment_id);
            appointment
        } else {
            self.booking_service
                .guarded_update(&appointment, json!({ "status": status }))
                .await?
        };

        info!("Appointment {} completed by doctor {:?}", appointment_id, actor.profile_id);
        Ok(CompletedAppointment { appointment, treatment })
    }

    pub async fn treatment_for_appointment(&self, appointment_id: i64) -> Result<Option<Treatment>, AppointmentError> {
        let path = format!("/rest/v1/treatments?appointment_id=eq.{}", appointment_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(AppointmentError::from))
            .transpose()
    }

    /// Newest visit first.
    pub async fn treatments_for_patient(&self, patient_id: i64) -> Result<Vec<Treatment>, AppointmentError> {
        debug!("Fetching treatments for patient {}", patient_id);

        let path = format!("/rest/v1/treatments?patient_id=eq.{}&order=visit_date.desc", patient_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppointmentError::from))
            .collect()
    }
}
