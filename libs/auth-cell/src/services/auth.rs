use tracing::{debug, info, warn};

use doctor_cell::services::DoctorService;
use patient_cell::models::{CreatePatientProfile, Patient};
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_models::access::Role;
use shared_models::auth::User;
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, LoginRequest, LoginResponse, RegisterRequest, UserAccount};
use crate::services::credentials::{normalize_email, require_field, require_password};
use crate::services::password::PasswordService;
use crate::services::user::UserService;

pub struct AuthService {
    users: UserService,
    patients: PatientService,
    doctors: DoctorService,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            users: UserService::new(config),
            patients: PatientService::new(config),
            doctors: DoctorService::new(config),
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    /// Patient self-registration: a patient account plus its profile.
    pub async fn register(&self, request: RegisterRequest) -> Result<(UserAccount, Patient), AuthError> {
        let email = normalize_email(request.email.as_deref())?;
        let name = require_field(request.name.as_deref(), "Name")?;
        let password = require_password(request.password.as_deref())?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration refused, {} already registered", email);
            return Err(AuthError::EmailTaken);
        }

        let user = self.users.create_user(&email, password, Role::Patient).await?;

        let profile = CreatePatientProfile { user_id: user.id, name: name.to_string() };
        let patient = match self.patients.create_patient_profile(profile).await {
            Ok(patient) => patient,
            Err(e) => {
                // Leave no account behind without a profile
                warn!("Patient profile for user {} failed, removing account: {}", user.id, e);
                self.users.delete_user(user.id).await?;
                return Err(e.into());
            }
        };

        info!("Patient {} registered as user {}", patient.id, user.id);
        Ok((user, patient))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(request.email.as_deref())?;
        let password = require_password(request.password.as_deref())?;
        debug!("Login attempt for {}", email);

        let user = self.users.find_by_email(&email).await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.password_hash)? {
            warn!("Wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            warn!("Login refused for deactivated user {}", user.id);
            return Err(AuthError::AccountDisabled);
        }

        let profile_id = self.profile_id(&user).await?;
        let claims = User {
            id: user.id.to_string(),
            email: Some(user.email.clone()),
            role: Some(user.role.to_string()),
            profile_id,
            created_at: None,
        };
        let token = issue_token(&claims, &self.jwt_secret, self.token_ttl_hours)
            .map_err(AuthError::Internal)?;

        info!("User {} logged in as {}", user.id, user.role);
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in_hours: self.token_ttl_hours,
            user,
            profile_id,
        })
    }

    /// Doctor or patient profile owned by the account.
    pub async fn profile_id(&self, user: &UserAccount) -> Result<Option<i64>, AuthError> {
        Ok(match user.role {
            Role::Admin => None,
            Role::Doctor => self.doctors.find_by_user(user.id).await?.map(|d| d.id),
            Role::Patient => self.patients.find_by_user(user.id).await?.map(|p| p.id),
        })
    }

    /// Creates the admin account on first start. Returns whether one was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let email = normalize_email(Some(email))?;
        let password = require_password(Some(password))?;

        if self.users.find_by_email(&email).await?.is_some() {
            debug!("Admin account {} already present", email);
            return Ok(false);
        }

        self.users.create_user(&email, password, Role::Admin).await?;
        info!("Admin account {} created", email);
        Ok(true)
    }
}
