use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_models::access::Role;
use shared_utils::query::search_term;

use crate::models::{AuthError, UserAccount};
use crate::services::password::PasswordService;

/// Accounts in the `users` table.
pub struct UserService {
    supabase: SupabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Creates an active account. `email` must already be normalized.
    pub async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<UserAccount, AuthError> {
        debug!("Creating {} account for {}", role, email);

        let password_hash = PasswordService::hash_password(password)?;
        let body = json!({
            "email": email,
            "password_hash": password_hash,
            "role": role,
            "is_active": true,
        });

        let rows = self.supabase
            .request_returning(Method::POST, "/rest/v1/users", Some(body))
            .await
            .map_err(|e| match SupabaseError::from_anyhow(&e) {
                Some(err) if err.is_unique_violation() => AuthError::EmailTaken,
                _ => AuthError::from(e),
            })?;

        let row = rows.into_iter().next()
            .ok_or_else(|| AuthError::DatabaseError("Failed to create user".to_string()))?;
        let user: UserAccount = serde_json::from_value(row)?;

        info!("User {} created with role {}", user.id, user.role);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AuthError> {
        let path = format!("/rest/v1/users?email=eq.{}", urlencoding::encode(email));
        self.fetch_one(&path).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserAccount, AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        self.fetch_one(&path).await?.ok_or(AuthError::NotFound)
    }

    /// Enables or disables login for an account.
    pub async fn set_active(&self, user_id: i64, active: bool) -> Result<UserAccount, AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let rows = self.supabase
            .request_returning(Method::PATCH, &path, Some(json!({ "is_active": active })))
            .await?;

        let row = rows.into_iter().next().ok_or(AuthError::NotFound)?;
        let user: UserAccount = serde_json::from_value(row)?;

        if active {
            info!("User {} reactivated", user_id);
        } else {
            warn!("User {} deactivated", user_id);
        }
        Ok(user)
    }

    /// Removes the account; dependent profiles, appointments and treatments
    /// go with it through the schema's cascades.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let rows = self.supabase.request_returning(Method::DELETE, &path, None).await?;

        if rows.is_empty() {
            return Err(AuthError::NotFound);
        }
        info!("User {} deleted", user_id);
        Ok(())
    }

    /// Ids of accounts with `role` whose email contains `query`.
    pub async fn search_ids_by_email(&self, query: &str, role: Role) -> Result<Vec<i64>, AuthError> {
        let term = search_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!(
            "/rest/v1/users?select=id&role=eq.{}&email=ilike.*{}*",
            role,
            urlencoding::encode(&term)
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.iter().filter_map(|r| r["id"].as_i64()).collect())
    }

    async fn fetch_one(&self, path: &str) -> Result<Option<UserAccount>, AuthError> {
        let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(AuthError::from))
            .transpose()
    }
}
