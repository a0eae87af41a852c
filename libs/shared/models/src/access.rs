//! Caller identity and role capabilities shared by every cell.
//!
//! Handlers turn the authenticated [`User`] into an [`Actor`] once and then
//! ask it for the capability an operation needs, instead of comparing role
//! strings inline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(AppError::Auth(format!("Unknown role: {}", other))),
        }
    }
}

/// An authenticated caller: user account, role and owned profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
    pub profile_id: Option<i64>,
}

impl Actor {
    pub fn new(user_id: i64, role: Role, profile_id: Option<i64>) -> Self {
        Self { user_id, role, profile_id }
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, Role::Admin, None)
    }

    pub fn doctor(user_id: i64, doctor_id: i64) -> Self {
        Self::new(user_id, Role::Doctor, Some(doctor_id))
    }

    pub fn patient(user_id: i64, patient_id: i64) -> Self {
        Self::new(user_id, Role::Patient, Some(patient_id))
    }

    pub fn from_user(user: &User) -> Result<Self, AppError> {
        let user_id = user.id.parse::<i64>()
            .map_err(|_| AppError::Auth("Invalid subject in token".to_string()))?;
        let role = user.role.as_deref()
            .ok_or_else(|| AppError::Auth("Token carries no role".to_string()))?
            .parse::<Role>()?;

        Ok(Self::new(user_id, role, user.profile_id))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with Forbidden unless the actor holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} may not perform this action", self.role
            )))
        }
    }

    pub fn require(&self, role: Role) -> Result<(), AppError> {
        self.require_any(&[role])
    }

    /// Doctor profile id of a doctor actor.
    pub fn doctor_id(&self) -> Result<i64, AppError> {
        self.require(Role::Doctor)?;
        self.profile_id
            .ok_or_else(|| AppError::NotFound("Doctor profile not found".to_string()))
    }

    /// Patient profile id of a patient actor.
    pub fn patient_id(&self) -> Result<i64, AppError> {
        self.require(Role::Patient)?;
        self.profile_id
            .ok_or_else(|| AppError::NotFound("Patient profile not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user(id: &str, role: Option<&str>, profile_id: Option<i64>) -> User {
        User {
            id: id.to_string(),
            email: None,
            role: role.map(str::to_string),
            profile_id,
            created_at: None,
        }
    }

    #[test]
    fn test_actor_from_user() {
        let actor = Actor::from_user(&user("12", Some("doctor"), Some(4))).unwrap();
        assert_eq!(actor, Actor::doctor(12, 4));
    }

    #[test]
    fn test_actor_rejects_bad_subject_and_role() {
        assert_matches!(Actor::from_user(&user("abc", Some("patient"), None)), Err(AppError::Auth(_)));
        assert_matches!(Actor::from_user(&user("1", Some("nurse"), None)), Err(AppError::Auth(_)));
        assert_matches!(Actor::from_user(&user("1", None, None)), Err(AppError::Auth(_)));
    }

    #[test]
    fn test_require_role() {
        let admin = Actor::admin(1);
        assert!(admin.require(Role::Admin).is_ok());
        assert_matches!(admin.require(Role::Patient), Err(AppError::Forbidden(_)));
        assert!(admin.require_any(&[Role::Doctor, Role::Admin]).is_ok());
    }

    #[test]
    fn test_profile_ids_are_role_bound() {
        let patient = Actor::patient(2, 7);
        assert_eq!(patient.patient_id().unwrap(), 7);
        assert_matches!(patient.doctor_id(), Err(AppError::Forbidden(_)));

        let orphan = Actor::new(3, Role::Doctor, None);
        assert_matches!(orphan.doctor_id(), Err(AppError::NotFound(_)));
    }
}
