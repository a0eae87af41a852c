//! Who may do what to an appointment.

use shared_models::access::{Actor, Role};

use crate::models::{Appointment, AppointmentError};

pub struct AppointmentPolicy;

impl AppointmentPolicy {
    fn is_owner(actor: &Actor, appointment: &Appointment) -> bool {
        actor.role == Role::Patient && actor.profile_id == Some(appointment.patient_id)
    }

    fn is_assigned_doctor(actor: &Actor, appointment: &Appointment) -> bool {
        actor.role == Role::Doctor && actor.profile_id == Some(appointment.doctor_id)
    }

    fn check(allowed: bool, action: &str) -> Result<(), AppointmentError> {
        if allowed {
            Ok(())
        } else {
            Err(AppointmentError::Forbidden(format!("Not allowed to {} this appointment", action)))
        }
    }

    pub fn can_view(actor: &Actor, appointment: &Appointment) -> Result<(), AppointmentError> {
        Self::check(
            actor.is_admin() || Self::is_owner(actor, appointment) || Self::is_assigned_doctor(actor, appointment),
            "view",
        )
    }

    pub fn can_cancel(actor: &Actor, appointment: &Appointment) -> Result<(), AppointmentError> {
        Self::check(
            Self::is_owner(actor, appointment) || Self::is_assigned_doctor(actor, appointment),
            "cancel",
        )
    }

    pub fn can_reschedule(actor: &Actor, appointment: &Appointment) -> Result<(), AppointmentError> {
        Self::check(Self::is_owner(actor, appointment), "reschedule")
    }

    pub fn can_complete(actor: &Actor, appointment: &Appointment) -> Result<(), AppointmentError> {
        Self::check(Self::is_assigned_doctor(actor, appointment), "complete")
    }

    /// Patient profile a booking is made for.
    pub fn booking_patient(actor: &Actor) -> Result<i64, AppointmentError> {
        match (actor.role, actor.profile_id) {
            (Role::Patient, Some(patient_id)) => Ok(patient_id),
            (Role::Patient, None) => Err(AppointmentError::PatientNotFound),
            _ => Err(AppointmentError::Forbidden("Only patients can book appointments".to_string())),
        }
    }
}
