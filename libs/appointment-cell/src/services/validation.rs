//! Parsing of raw booking fields into a [`SlotRef`].

use chrono::NaiveDate;

use crate::models::{AppointmentError, SlotRef};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate, AppointmentError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppointmentError::ValidationError("Date is required".to_string()))?;

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppointmentError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

pub fn parse_time_slot(raw: Option<&str>) -> Result<String, AppointmentError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppointmentError::ValidationError("Time slot is required".to_string()))
}

pub fn parse_slot(
    doctor_id: Option<i64>,
    date: Option<&str>,
    time_slot: Option<&str>,
) -> Result<SlotRef, AppointmentError> {
    let doctor_id = doctor_id
        .ok_or_else(|| AppointmentError::ValidationError("Doctor is required".to_string()))?;

    Ok(SlotRef {
        doctor_id,
        date: parse_date(date)?,
        time_slot: parse_time_slot(time_slot)?,
    })
}
