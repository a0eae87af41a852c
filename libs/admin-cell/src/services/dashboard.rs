use chrono::NaiveDate;
use tracing::debug;

use appointment_cell::services::AppointmentHistoryService;
use doctor_cell::services::DoctorService;
use patient_cell::services::PatientService;
use shared_config::AppConfig;

use crate::models::{AdminDashboard, AdminError};

pub struct AdminDashboardService {
    doctors: DoctorService,
    patients: PatientService,
    history: AppointmentHistoryService,
}

impl AdminDashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
            history: AppointmentHistoryService::new(config),
        }
    }

    /// Head counts, Booked appointments from `today` on, and the latest completions.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<AdminDashboard, AdminError> {
        debug!("Building admin dashboard for {}", today);

        let (doctor_count, patient_count, upcoming_appointments, recent_completed) = futures::try_join!(
            async { self.doctors.count_doctors().await.map_err(AdminError::from) },
            async { self.patients.count_patients().await.map_err(AdminError::from) },
            async { self.history.upcoming_booked(today).await.map_err(AdminError::from) },
            async { self.history.recent_completed().await.map_err(AdminError::from) },
        )?;

        Ok(AdminDashboard {
            doctor_count,
            patient_count,
            upcoming_appointments,
            recent_completed,
        })
    }
}
