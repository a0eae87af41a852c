//! Normalization of submitted email, name and password fields.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::AuthError;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Trimmed, lower-cased email.
pub fn normalize_email(raw: Option<&str>) -> Result<String, AuthError> {
    let email = raw.map(|e| e.trim().to_lowercase()).unwrap_or_default();

    if email.is_empty() {
        return Err(AuthError::ValidationError("Email is required".to_string()));
    }
    if !email_pattern().is_match(&email) {
        return Err(AuthError::ValidationError(format!("Invalid email address: {}", email)));
    }
    Ok(email)
}

pub fn require_field<'a>(raw: Option<&'a str>, field: &str) -> Result<&'a str, AuthError> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::ValidationError(format!("{} is required", field)))
}

/// Passwords are taken verbatim; only emptiness is rejected.
pub fn require_password(raw: Option<&str>) -> Result<&str, AuthError> {
    raw.filter(|p| !p.is_empty())
        .ok_or_else(|| AuthError::ValidationError("Password is required".to_string()))
}
