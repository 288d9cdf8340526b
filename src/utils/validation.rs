//! Input validation for account registration and check-in payloads

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{error::AppError, models::RegisterRequest};

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Failed to compile email regex")
});

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("username is required".to_string());
    }

    if username.len() < 3 {
        return Err("username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("username must be at most 32 characters long".to_string());
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err("username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }

    if email.len() > 120 {
        return Err("email must be at most 120 characters long".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("email is not valid".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("password is required".to_string());
    }

    if password.len() < 8 {
        return Err("password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("password must be at most 128 characters long".to_string());
    }

    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<(), String> {
    if full_name.trim().is_empty() {
        return Err("full_name is required".to_string());
    }

    if full_name.len() > 120 {
        return Err("full_name must be at most 120 characters long".to_string());
    }

    Ok(())
}

pub fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), String> {
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err("lat must be between -90 and 90".to_string());
        }
    }
    if let Some(lng) = lng {
        if !(-180.0..=180.0).contains(&lng) {
            return Err("lng must be between -180 and 180".to_string());
        }
    }
    Ok(())
}

/// Runs every registration rule, first failure wins.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    validate_username(req.username.trim())
        .and_then(|_| validate_email(req.email.trim()))
        .and_then(|_| validate_full_name(&req.full_name))
        .and_then(|_| validate_password(&req.password))
        .map_err(AppError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Budi Santoso".to_string(),
            phone: None,
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validate_registration(&registration("budi_01", "budi@company.co.id", "s3cretpass")).is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("budi santoso").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn rejects_bad_emails() {
        for email in ["", "budi", "budi@", "@company.com", "budi@company", "budi @company.com"] {
            assert!(validate_email(email).is_err(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn rejects_short_passwords() {
        let err = validate_registration(&registration("budi", "budi@company.com", "short")).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("8 characters")));
    }

    #[test]
    fn coordinates_must_be_on_earth() {
        assert!(validate_coordinates(Some(-6.2), Some(106.8)).is_ok());
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(91.0), None).is_err());
        assert!(validate_coordinates(None, Some(-180.5)).is_err());
    }
}
