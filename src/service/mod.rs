pub mod attendance;
pub mod auth;

pub use attendance::AttendanceService;
pub use auth::AuthService;
