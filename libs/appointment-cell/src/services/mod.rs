pub mod booking;
pub mod conflict;
pub mod history;
pub mod lifecycle;
pub mod policy;
pub mod treatment;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use history::AppointmentHistoryService;
pub use lifecycle::{AppointmentAction, AppointmentLifecycleService, Transition};
pub use policy::AppointmentPolicy;
pub use treatment::TreatmentService;
