use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use tracing::instrument;

use crate::{
    auth::middleware::bearer_token,
    error::AppError,
    models::{ApiResponse, LoginRequest, RegisterRequest},
    service::AuthService,
};

/// Login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login succeeded", body = Object, example = json!({
            "code": 201,
            "msg": "Login succeeded",
            "err": "",
            "data": {
                "id": 1,
                "username": "budi",
                "email": "budi@company.com",
                "role": "EMPLOYEE",
                "access_token": "eyJ...",
                "refresh_token": "eyJ...",
                "expires_in": 900,
                "token_type": "Bearer"
            }
        })),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(skip_all)]
pub async fn login(
    payload: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let res = auth.login(payload.into_inner()).await?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Login succeeded", res))
}

/// Create account
#[utoipa::path(
    post,
    path = "/create",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Object, example = json!({
            "code": 201,
            "msg": "Account created",
            "err": "",
            "data": {
                "id": 1,
                "username": "budi",
                "email": "budi@company.com",
                "full_name": "Budi Santoso",
                "phone": "+628123456789",
                "role": "EMPLOYEE",
                "is_active": true,
                "last_login_at": null,
                "created_at": "2026-01-05T01:00:00Z",
                "updated_at": "2026-01-05T01:00:00Z"
            }
        })),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(skip_all)]
pub async fn create_account(
    payload: web::Json<RegisterRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let account = auth.create_account(payload.into_inner()).await?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Account created", account))
}

/// Refresh tokens
#[utoipa::path(
    post,
    path = "/refresh",
    responses(
        (status = 200, description = "New token pair issued"),
        (status = 401, description = "Missing, invalid or non-refresh token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(skip_all)]
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers()).map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let res = auth.refresh(token).await?;

    Ok(ApiResponse::success(StatusCode::OK, "Token refreshed", res))
}
