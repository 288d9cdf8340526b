use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::role::Role;
use crate::models::{AccountResponse, CheckInPayload, LoginRequest, LoginResponse, RegisterRequest};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Attendance API",
        version = "1.0.0",
        description = r#"
## HR Attendance Service

Daily attendance tracking for employees plus the account endpoints that issue their tokens.

### 🔹 Key Features
- **Accounts**
  - Create accounts, log in, refresh tokens
- **Attendance**
  - Check in (repeatable until check-out), check out once, view today's record

### 🔐 Security
Attendance endpoints require a **JWT Bearer** access token.

### 📦 Response Format
Every response uses the envelope `{ code, msg, err, data }`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::create_account,
        crate::auth::handlers::refresh,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            AccountResponse,
            Role,
            CheckInPayload,
            AttendanceRecord,
            AttendanceStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Account and token APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
