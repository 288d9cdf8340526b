use actix_web::{HttpResponse, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{role::Role, user::UserAccount};

/// Envelope every endpoint answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    /// empty on success
    pub err: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, msg: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse {
            code: status.as_u16(),
            msg: msg.into(),
            err: String::new(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn failure(status: StatusCode, msg: impl Into<String>, err: impl Into<String>) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse::<()> {
            code: status.as_u16(),
            msg: msg.into(),
            err: err.into(),
            data: None,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "s3cretpass")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "budi@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Budi Santoso")]
    pub full_name: String,
    #[schema(example = "+628123456789", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "s3cretpass")]
    pub password: String,
    /// Defaults to EMPLOYEE
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
    /// access token lifetime in seconds
    #[schema(example = 900)]
    pub expires_in: usize,
    #[schema(example = "Bearer")]
    pub token_type: String,
}

/// Public view of an account, never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            phone: account.phone,
            role: account.role,
            is_active: account.is_active,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CheckInPayload {
    #[schema(example = "field work")]
    pub activity: String,
    #[schema(example = json!(-6.2))]
    pub lat: Option<f64>,
    #[schema(example = 106.8)]
    pub lng: Option<f64>,
    #[schema(example = "https://cdn.example.com/selfie.jpg")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
