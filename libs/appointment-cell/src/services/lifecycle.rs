use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Cancel,
    Complete,
    Reschedule,
}

impl AppointmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentAction::Cancel => "cancel",
            AppointmentAction::Complete => "complete",
            AppointmentAction::Reschedule => "reschedule",
        }
    }
}

/// Outcome of applying an action to an appointment's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the new status.
    Apply(AppointmentStatus),
    /// Already in the requested state.
    NoOp,
}

#[derive(Debug, Default)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Booked moves to Completed or Cancelled, Cancelled returns to Booked only
    /// through reschedule, and Completed accepts nothing but re-completion.
    pub fn transition(
        &self,
        current: AppointmentStatus,
        action: AppointmentAction,
    ) -> Result<Transition, AppointmentError> {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        debug!("Validating {} on {} appointment", action.as_str(), current);

        let outcome = match (current, action) {
            (Booked, Cancel) => Some(Transition::Apply(Cancelled)),
            (Cancelled, Cancel) => Some(Transition::NoOp),
            (Booked | Completed, Complete) => Some(Transition::Apply(Completed)),
            (Booked | Cancelled, Reschedule) => Some(Transition::Apply(Booked)),
            (Completed, Cancel) | (Cancelled, Complete) | (Completed, Reschedule) => None,
        };

        outcome.ok_or_else(|| {
            warn!("Rejected {} on {} appointment", action.as_str(), current);
            AppointmentError::InvalidStatusTransition { from: current, action: action.as_str() }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use AppointmentAction::*;
    use AppointmentStatus::*;

    #[test]
    fn test_booked_transitions() {
        let lifecycle = AppointmentLifecycleService::new();

        assert_eq!(lifecycle.transition(Booked, Cancel).unwrap(), Transition::Apply(Cancelled));
        assert_eq!(lifecycle.transition(Booked, Complete).unwrap(), Transition::Apply(Completed));
        assert_eq!(lifecycle.transition(Booked, Reschedule).unwrap(), Transition::Apply(Booked));
    }

    #[test]
    fn test_cancelled_can_only_be_rescheduled() {
        let lifecycle = AppointmentLifecycleService::new();

        assert_eq!(lifecycle.transition(Cancelled, Cancel).unwrap(), Transition::NoOp);
        assert_eq!(lifecycle.transition(Cancelled, Reschedule).unwrap(), Transition::Apply(Booked));
        assert_matches!(
            lifecycle.transition(Cancelled, Complete),
            Err(AppointmentError::InvalidStatusTransition { from: Cancelled, action: "complete" })
        );
    }

    #[test]
    fn test_completed_is_terminal_except_recompletion() {
        let lifecycle = AppointmentLifecycleService::new();

        assert_eq!(lifecycle.transition(Completed, Complete).unwrap(), Transition::Apply(Completed));
        assert_matches!(lifecycle.transition(Completed, Cancel), Err(AppointmentError::InvalidStatusTransition { .. }));
        assert_matches!(lifecycle.transition(Completed, Reschedule), Err(AppointmentError::InvalidStatusTransition { .. }));
    }
}
