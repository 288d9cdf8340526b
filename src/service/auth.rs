use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_dummy_password, verify_password},
    },
    config::Config,
    error::{AppError, AppResult},
    model::user::{NewAccount, UserAccount},
    models::{AccountResponse, LoginRequest, LoginResponse, RegisterRequest, TokenType},
    store::AccountStore,
    utils::validation::validate_registration,
};

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    jwt_secret: String,
    access_token_ttl: usize,
    refresh_token_ttl: usize,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, config: &Config) -> Self {
        Self {
            accounts,
            jwt_secret: config.jwt_secret.clone(),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    /// Unknown usernames and wrong passwords fail the same way.
    #[instrument(name = "auth_login", skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(AppError::Validation("username and password are required".to_string()));
        }

        let account = match self.accounts.find_by_username(username).await? {
            Some(account) => account,
            None => {
                verify_dummy_password(&req.password);
                info!("Invalid credentials: user not found");
                return Err(AppError::InvalidCredentials);
            }
        };

        debug!(user_id = account.id, "Verifying password");
        if !verify_password(&req.password, &account.password_hash)? {
            info!(user_id = account.id, "Invalid credentials: password mismatch");
            if let Err(e) = self.accounts.record_failed_login(account.id).await {
                error!(error = %e, user_id = account.id, "Failed to record failed login");
            }
            return Err(AppError::InvalidCredentials);
        }

        if !account.is_active {
            info!(user_id = account.id, "Login refused: account inactive");
            return Err(AppError::AccountInactive);
        }

        if let Err(e) = self.accounts.record_login(account.id, Utc::now()).await {
            // not worth failing the login over
            error!(error = %e, user_id = account.id, "Failed to update last_login_at");
        }

        info!(user_id = account.id, "Login successful");
        self.issue_tokens(&account)
    }

    /// Trades a valid refresh token for a new token pair.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<LoginResponse> {
        let claims = verify_token(refresh_token, &self.jwt_secret).map_err(|e| {
            debug!(error = %e, "Refresh token rejected");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized("refresh token required".to_string()));
        }

        let account = self
            .accounts
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;
        if !account.is_active {
            return Err(AppError::AccountInactive);
        }

        self.issue_tokens(&account)
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn create_account(&self, req: RegisterRequest) -> AppResult<AccountResponse> {
        validate_registration(&req)?;

        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();

        if self.accounts.exists(&username, &email).await? {
            info!("Registration refused: username or email taken");
            return Err(AppError::Conflict("username or email already exists".to_string()));
        }

        let password_hash = hash_password(&req.password)?;

        let created = self
            .accounts
            .insert(NewAccount {
                username,
                email,
                full_name: req.full_name.trim().to_string(),
                phone: req.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
                password_hash,
                role: req.role.unwrap_or_default(),
            })
            .await
            .inspect_err(|e| {
                if !matches!(e, AppError::Conflict(_)) {
                    warn!(error = %e, "Failed to create account");
                }
            })?;

        info!(user_id = created.id, role = %created.role, "Account created");
        Ok(created.into())
    }

    fn issue_tokens(&self, account: &UserAccount) -> AppResult<LoginResponse> {
        let access_token = generate_access_token(
            account.id,
            account.username.clone(),
            account.role,
            &self.jwt_secret,
            self.access_token_ttl,
        )?;

        let (refresh_token, refresh_claims) = generate_refresh_token(
            account.id,
            account.username.clone(),
            account.role,
            &self.jwt_secret,
            self.refresh_token_ttl,
        )?;
        debug!(user_id = account.id, jti = %refresh_claims.jti, "Issued refresh token");

        Ok(LoginResponse {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            access_token,
            refresh_token,
            expires_in: self.access_token_ttl,
            token_type: "Bearer".to_string(),
        })
    }
}
