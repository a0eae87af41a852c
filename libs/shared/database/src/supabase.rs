use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for a foreign key violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Constraint violation ({code}): {message}")]
    Conflict { code: String, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl SupabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, SupabaseError::Conflict { code, .. } if code == UNIQUE_VIOLATION)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, SupabaseError::Conflict { code, .. } if code == FOREIGN_KEY_VIOLATION)
    }

    /// Inspects an error chain for a storage-level rejection.
    pub fn from_anyhow(err: &anyhow::Error) -> Option<&SupabaseError> {
        err.downcast_ref::<SupabaseError>()
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self, extra: Option<HeaderMap>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        if let Some(extra) = extra {
            headers.extend(extra);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         body: Option<Value>, headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(headers)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(Self::classify_error(status, error_text).into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Write helper returning the affected rows.
    pub async fn request_returning(&self, method: Method, path: &str, body: Option<Value>)
                                   -> Result<Vec<Value>> {
        self.request_with_headers(method, path, body, Some(Self::prefer("return=representation")))
            .await
    }

    /// Insert-or-merge on the given conflict target, returning the stored row.
    pub async fn upsert(&self, table: &str, on_conflict: &str, body: Value) -> Result<Value> {
        let path = format!("/rest/v1/{}?on_conflict={}", table, on_conflict);
        let rows: Vec<Value> = self.request_with_headers(
            Method::POST,
            &path,
            Some(body),
            Some(Self::prefer("resolution=merge-duplicates,return=representation")),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Upsert into {} returned no rows", table))
    }

    /// Counts rows matching a PostgREST filter.
    pub async fn count(&self, table: &str, filter: &str) -> Result<usize> {
        let path = if filter.is_empty() {
            format!("/rest/v1/{}?select=id", table)
        } else {
            format!("/rest/v1/{}?select=id&{}", table, filter)
        };
        let rows: Vec<Value> = self.request(Method::GET, &path, None).await?;
        Ok(rows.len())
    }

    fn prefer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static(value));
        headers
    }

    fn classify_error(status: StatusCode, error_text: String) -> SupabaseError {
        let parsed: Option<PostgrestErrorBody> = serde_json::from_str(&error_text).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());
        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| error_text.clone());

        match status.as_u16() {
            401 | 403 => SupabaseError::Auth(message),
            404 => SupabaseError::NotFound(message),
            409 => SupabaseError::Conflict {
                code: code.unwrap_or_default(),
                message,
            },
            // PostgREST reports some constraint failures as 400 with a SQLSTATE code
            _ if code.as_deref() == Some(UNIQUE_VIOLATION)
                || code.as_deref() == Some(FOREIGN_KEY_VIOLATION) => SupabaseError::Conflict {
                code: code.unwrap_or_default(),
                message,
            },
            other => SupabaseError::Api { status: other, message },
        }
    }
}
