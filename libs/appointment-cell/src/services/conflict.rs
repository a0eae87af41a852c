use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_database::supabase::{SupabaseClient, SupabaseError, FOREIGN_KEY_VIOLATION};

use crate::models::{AppointmentError, AppointmentStatus, SlotRef};

pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// True iff a non-cancelled appointment other than `exclude_appointment_id`
    /// holds the slot.
    pub async fn is_slot_taken(
        &self,
        slot: &SlotRef,
        exclude_appointment_id: Option<i64>,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking slot '{}' for doctor {} on {}", slot.time_slot, slot.doctor_id, slot.date);

        let mut path = format!(
            "/rest/v1/appointments?select=id&doctor_id=eq.{}&date=eq.{}&time_slot=eq.{}&status=neq.{}",
            slot.doctor_id,
            slot.date,
            urlencoding::encode(&slot.time_slot),
            AppointmentStatus::Cancelled,
        );
        if let Some(id) = exclude_appointment_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        let taken = !rows.is_empty();

        if taken {
            warn!("Slot '{}' for doctor {} on {} is taken", slot.time_slot, slot.doctor_id, slot.date);
        }
        Ok(taken)
    }

    /// Maps a write rejected by the active-slot index to [`AppointmentError::SlotTaken`]
    /// and a dangling doctor or patient reference to the matching not-found error.
    pub fn classify_write_error(err: anyhow::Error) -> AppointmentError {
        let classified = match SupabaseError::from_anyhow(&err) {
            Some(e) if e.is_unique_violation() => {
                warn!("Slot claimed concurrently: {}", e);
                Some(AppointmentError::SlotTaken)
            }
            Some(SupabaseError::Conflict { code, message }) if code == FOREIGN_KEY_VIOLATION => {
                if message.contains("patient") {
                    Some(AppointmentError::PatientNotFound)
                } else {
                    Some(AppointmentError::DoctorNotFound)
                }
            }
            _ => None,
        };

        classified.unwrap_or_else(|| AppointmentError::from(err))
    }
}
