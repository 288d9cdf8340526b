//! Persistence seams.
//!
//! Services only see these traits; `account` and `attendance` back them with
//! sqlx on MySQL, `memory` with concurrent maps for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::AppResult,
    model::{
        attendance::{AttendanceRecord, NewCheckIn},
        user::{NewAccount, UserAccount},
    },
};

pub mod account;
pub mod attendance;
pub mod memory;

pub use account::MySqlAccountStore;
pub use attendance::MySqlAttendanceStore;
pub use memory::{InMemoryAccountStore, InMemoryAttendanceStore};

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Creates the day's record or coalesces into the existing one, atomically.
    ///
    /// Returns the stored record and whether it was created by this call. A
    /// record that is already checked out comes back untouched.
    async fn upsert_check_in(&self, check_in: NewCheckIn) -> AppResult<(AttendanceRecord, bool)>;

    async fn get_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>>;

    /// Closes an open record. `None` when no checked-in, not checked-out
    /// record matched.
    async fn check_out(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Case-insensitive lookup, soft-deleted accounts are invisible.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserAccount>>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<UserAccount>>;

    /// true if either the username or the email is already taken
    async fn exists(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Fails with `AppError::Conflict` on a duplicate username or email.
    async fn insert(&self, account: NewAccount) -> AppResult<UserAccount>;

    async fn record_failed_login(&self, id: u64) -> AppResult<()>;

    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> AppResult<()>;
}
