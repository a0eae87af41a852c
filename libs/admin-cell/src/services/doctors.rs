use tracing::{info, warn};

use auth_cell::services::credentials::{normalize_email, require_field, require_password};
use auth_cell::services::UserService;
use doctor_cell::models::{CreateDoctorProfile, Doctor, UpdateDoctorRequest};
use doctor_cell::services::{DepartmentService, DoctorService};
use shared_config::AppConfig;
use shared_models::access::Role;

use crate::models::{AddDoctorRequest, AdminError, CreatedDoctor};

pub struct AdminDoctorService {
    users: UserService,
    doctors: DoctorService,
    departments: DepartmentService,
}

impl AdminDoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            users: UserService::new(config),
            doctors: DoctorService::new(config),
            departments: DepartmentService::new(config),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, AdminError> {
        Ok(self.doctors.list_doctors().await?)
    }

    /// Creates a doctor login and its profile in one step.
    pub async fn add_doctor(&self, request: AddDoctorRequest) -> Result<CreatedDoctor, AdminError> {
        let name = require_field(request.name.as_deref(), "Name")?;
        let email = normalize_email(request.email.as_deref())?;
        let password = require_password(request.password.as_deref())?;
        let department_id = request.department_id
            .ok_or_else(|| AdminError::ValidationError("Department is required".to_string()))?;
        if request.experience_years.is_some_and(|years| years < 0) {
            return Err(AdminError::ValidationError("Experience years cannot be negative".to_string()));
        }

        self.departments.get_department(department_id).await?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AdminError::Conflict(format!("Email {} is already registered", email)));
        }

        let user = self.users.create_user(&email, password, Role::Doctor).await?;

        let profile = CreateDoctorProfile {
            user_id: user.id,
            department_id,
            name: name.to_string(),
            experience_years: request.experience_years,
            bio: request.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
        };
        let doctor = match self.doctors.create_doctor_profile(profile).await {
            Ok(doctor) => doctor,
            Err(e) => {
                warn!("Doctor profile for user {} failed, removing account: {}", user.id, e);
                self.users.delete_user(user.id).await?;
                return Err(e.into());
            }
        };

        info!("Doctor {} added with account {}", doctor.id, user.id);
        Ok(CreatedDoctor { user_id: user.id, email: user.email, doctor })
    }

    pub async fn edit_doctor(&self, doctor_id: i64, request: UpdateDoctorRequest) -> Result<Doctor, AdminError> {
        let doctor = self.doctors.update_doctor(doctor_id, request).await?;
        info!("Doctor {} updated", doctor_id);
        Ok(doctor)
    }

    /// Disables the doctor's login. Appointments and profile are kept.
    pub async fn blacklist_doctor(&self, doctor_id: i64) -> Result<Doctor, AdminError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        self.users.set_active(doctor.user_id, false).await?;
        Ok(doctor)
    }
}
