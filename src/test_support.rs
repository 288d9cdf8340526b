//! Wiring for HTTP tests: in-memory stores behind the real routes.

use std::{net::SocketAddr, sync::Arc};

use actix_web::web::{self, Data};

use crate::{
    config::Config,
    models::{LoginRequest, RegisterRequest},
    routes::{self, RateLimiters},
    service::{AttendanceService, AuthService},
    store::{InMemoryAccountStore, InMemoryAttendanceStore},
};

pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

pub struct Session {
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TestState {
    pub config: Data<Config>,
    pub attendance: Data<AttendanceService>,
    pub auth: Data<AuthService>,
    pub limiters: RateLimiters,
    pub attendance_store: Arc<InMemoryAttendanceStore>,
}

impl TestState {
    pub fn new() -> Self {
        Self::with_config(Config::testing())
    }

    pub fn with_config(config: Config) -> Self {
        let attendance_store = Arc::new(InMemoryAttendanceStore::new());
        let account_store = Arc::new(InMemoryAccountStore::new());

        Self {
            attendance: Data::new(AttendanceService::new(
                attendance_store.clone(),
                config.business_offset,
            )),
            auth: Data::new(AuthService::new(account_store, &config)),
            limiters: RateLimiters::from_config(&config).unwrap(),
            config: Data::new(config),
            attendance_store,
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.attendance.clone())
            .app_data(self.auth.clone());
        routes::configure(cfg, &self.config, &self.limiters);
    }

    /// Creates an account directly through the service and logs it in.
    pub async fn register(&self, username: &str, password: &str) -> Session {
        self.auth
            .create_account(RegisterRequest {
                username: username.to_string(),
                email: format!("{username}@company.com"),
                full_name: "Test User".to_string(),
                phone: None,
                password: password.to_string(),
                role: None,
            })
            .await
            .unwrap();

        let tokens = self
            .auth
            .login(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap();

        Session {
            user_id: tokens.id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}
