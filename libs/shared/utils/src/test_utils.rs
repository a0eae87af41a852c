use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::issue_token;

static NEXT_USER_ID: AtomicI64 = AtomicI64::new(1000);

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_hours: 24,
            port: 3000,
            admin_email: None,
            admin_password: None,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub profile_id: Option<i64>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "patient", Some(1))
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str, profile_id: Option<i64>) -> Self {
        Self {
            id: NEXT_USER_ID.fetch_add(1, Ordering::Relaxed),
            email: email.to_string(),
            role: role.to_string(),
            profile_id,
        }
    }

    pub fn doctor(email: &str, doctor_id: i64) -> Self {
        Self::new(email, "doctor", Some(doctor_id))
    }

    pub fn patient(email: &str, patient_id: i64) -> Self {
        Self::new(email, "patient", Some(patient_id))
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin", None)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            profile_id: self.profile_id,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(&user.to_user(), secret, exp_hours.unwrap_or(24))
            .expect("test secret is non-empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row payloads shaped like the PostgREST responses for each table.
pub struct MockRows;

impl MockRows {
    pub fn user(id: i64, email: &str, role: &str, password_hash: &str, is_active: bool) -> serde_json::Value {
        json!({
            "id": id,
            "email": email,
            "password_hash": password_hash,
            "role": role,
            "is_active": is_active
        })
    }

    pub fn department(id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "overview": format!("{} department", name)
        })
    }

    pub fn doctor(id: i64, user_id: i64, department_id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "department_id": department_id,
            "name": name,
            "experience_years": 10,
            "bio": "Experienced physician"
        })
    }

    pub fn patient(id: i64, user_id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "name": name,
            "age": 34,
            "gender": "F",
            "contact": "555-0100",
            "address": "1 Main St"
        })
    }

    pub fn appointment(id: i64, doctor_id: i64, patient_id: i64, date: &str, slot: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "date": date,
            "time_slot": slot,
            "status": status,
            "created_at": "2024-05-01T09:00:00Z"
        })
    }

    pub fn availability(id: i64, doctor_id: i64, date: &str, morning: Option<&str>, afternoon: Option<&str>, evening: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "date": date,
            "morning_slot": morning,
            "afternoon_slot": afternoon,
            "evening_slot": evening
        })
    }

    pub fn treatment(id: i64, appointment_id: i64, patient_id: i64, notes: &str) -> serde_json::Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "patient_id": patient_id,
            "diagnosis": "Seasonal flu",
            "prescription": "Rest and fluids",
            "notes": notes,
            "visit_date": "2024-06-01"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_token_creation() {
        let config = TestConfig::default();
        let user = TestUser::doctor("doc@example.com", 3);
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

        assert_eq!(token.split('.').count(), 3);
        let decoded = validate_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(decoded.profile_id, Some(3));
    }

    #[test]
    fn test_user_ids_are_unique() {
        assert_ne!(TestUser::default().id, TestUser::default().id);
    }
}
