pub mod cascade;
pub mod dashboard;
pub mod doctors;
pub mod patients;
pub mod search;

pub use cascade::AccountRemovalService;
pub use dashboard::AdminDashboardService;
pub use doctors::AdminDoctorService;
pub use patients::AdminPatientService;
pub use search::AdminSearchService;
