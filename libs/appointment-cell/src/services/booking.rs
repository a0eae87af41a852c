use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::access::Actor;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    RescheduleAppointmentRequest, SlotCheckQuery, SlotRef,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::{AppointmentAction, AppointmentLifecycleService, Transition};
use crate::services::policy::AppointmentPolicy;
use crate::services::validation::{parse_date, parse_slot, parse_time_slot};

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    doctor_service: DoctorService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&supabase)),
            lifecycle_service: AppointmentLifecycleService::new(),
            doctor_service: DoctorService::new(config),
            supabase,
        }
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let row = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Appointment visible to `actor`.
    pub async fn view_appointment(&self, appointment_id: i64, actor: &Actor) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        AppointmentPolicy::can_view(actor, &appointment)?;
        Ok(appointment)
    }

    pub async fn check_slot(&self, query: SlotCheckQuery) -> Result<bool, AppointmentError> {
        let slot = parse_slot(query.doctor_id, query.date.as_deref(), query.time_slot.as_deref())?;
        self.conflict_service.is_slot_taken(&slot, None).await
    }

    /// Books a slot for `patient_id`. The active-slot index decides between
    /// concurrent bookings of the same slot; the loser gets `SlotTaken`.
    pub async fn book_appointment(
        &self,
        patient_id: i64,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let slot = parse_slot(request.doctor_id, request.date.as_deref(), request.time_slot.as_deref())?;
        debug!("Patient {} booking doctor {} on {} ({})", patient_id, slot.doctor_id, slot.date, slot.time_slot);

        self.doctor_service.get_doctor(slot.doctor_id).await?;

        if self.conflict_service.is_slot_taken(&slot, None).await? {
            return Err(AppointmentError::SlotTaken);
        }

        let body = json!({
            "doctor_id": slot.doctor_id,
            "patient_id": patient_id,
            "date": slot.date,
            "time_slot": slot.time_slot,
            "status": AppointmentStatus::Booked,
        });

        let rows = self.supabase
            .request_returning(Method::POST, "/rest/v1/appointments", Some(body))
            .await
            .map_err(ConflictDetectionService::classify_write_error)?;

        let row = rows.into_iter().next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;
        let appointment: Appointment = serde_json::from_value(row)?;

        info!("Appointment {} booked for patient {} with doctor {}", appointment.id, patient_id, slot.doctor_id);
        Ok(appointment)
    }

    pub async fn cancel_appointment(&self, appointment_id: i64, actor: &Actor) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        AppointmentPolicy::can_cancel(actor, &appointment)?;

        match self.lifecycle_service.transition(appointment.status, AppointmentAction::Cancel)? {
            Transition::NoOp => {
                debug!("Appointment {} already cancelled", appointment_id);
                Ok(appointment)
            }
            Transition::Apply(status) => {
                let updated = self.guarded_update(&appointment, json!({ "status": status })).await?;
                info!("Appointment {} cancelled by user {}", appointment_id, actor.user_id);
                Ok(updated)
            }
        }
    }

    /// Moves an appointment to a new date and slot. On any rejection the
    /// stored row is left as it was.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        actor: &Actor,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        AppointmentPolicy::can_reschedule(actor, &appointment)?;

        let target = SlotRef {
            doctor_id: appointment.doctor_id,
            date: parse_date(request.date.as_deref())?,
            time_slot: parse_time_slot(request.time_slot.as_deref())?,
        };

        let Transition::Apply(status) =
            self.lifecycle_service.transition(appointment.status, AppointmentAction::Reschedule)?
        else {
            return Ok(appointment);
        };

        if appointment.status == status && appointment.holds_slot(&target) {
            debug!("Appointment {} already holds the requested slot", appointment_id);
            return Ok(appointment);
        }

        if self.conflict_service.is_slot_taken(&target, Some(appointment_id)).await? {
            return Err(AppointmentError::SlotTaken);
        }

        let updated = self.guarded_update(&appointment, json!({
            "date": target.date,
            "time_slot": target.time_slot,
            "status": status,
        })).await?;

        info!("Appointment {} rescheduled to {} ({})", appointment_id, updated.date, updated.time_slot);
        Ok(updated)
    }

    /// PATCH conditioned on the status the caller read, so a concurrent
    /// transition makes this write match no rows.
    pub(crate) async fn guarded_update(&self, appointment: &Appointment, body: Value) -> Result<Appointment, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment.id, appointment.status
        );

        let rows = self.supabase
            .request_returning(Method::PATCH, &path, Some(body))
            .await
            .map_err(ConflictDetectionService::classify_write_error)?;

        let row = rows.into_iter().next().ok_or(AppointmentError::ConcurrentModification)?;
        Ok(serde_json::from_value(row)?)
    }
}
