use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs the service against the in-memory stores
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    /// Fixed offset that defines where a work day starts and ends
    pub business_offset: FixedOffset,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET must not be empty"));
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parse_var("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            business_offset: parse_var("BUSINESS_UTC_OFFSET", default_business_offset())?,

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_var("RATE_REGISTER_PER_MIN", 30)?,
            rate_refresh_per_min: parse_var("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_default(),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_var("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }

    #[cfg(test)]
    pub fn testing() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 604_800,
            business_offset: default_business_offset(),
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_refresh_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: String::new(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}

/// UTC+7 (WIB)
fn default_business_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is within offset range")
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid value {raw:?} for {key}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_business_offset() {
        let offset: FixedOffset = parse_value("BUSINESS_UTC_OFFSET", "+07:00").unwrap();
        assert_eq!(offset.local_minus_utc(), 7 * 3600);

        let offset: FixedOffset = parse_value("BUSINESS_UTC_OFFSET", "-03:30").unwrap();
        assert_eq!(offset.local_minus_utc(), -(3 * 3600 + 1800));
    }

    #[test]
    fn rejects_garbage_values() {
        assert!(parse_value::<usize>("ACCESS_TOKEN_TTL", "fifteen").is_err());
        assert!(parse_value::<tracing::Level>("LOG_LEVEL", "loud").is_err());
    }

    #[test]
    fn default_offset_is_utc_plus_seven() {
        assert_eq!(default_business_offset().local_minus_utc(), 25_200);
    }
}
