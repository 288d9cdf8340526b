//! In-memory stores for development and testing

use std::sync::{
    RwLock,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::{DashMap, mapref::entry::Entry};

use super::{AccountStore, AttendanceStore};
use crate::{
    error::{AppError, AppResult},
    model::{
        attendance::{AttendanceRecord, NewCheckIn},
        user::{NewAccount, UserAccount},
    },
};

pub struct InMemoryAttendanceStore {
    records: DashMap<(u64, NaiveDate), AttendanceRecord>,
    next_id: AtomicU64,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl Default for InMemoryAttendanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn upsert_check_in(&self, check_in: NewCheckIn) -> AppResult<(AttendanceRecord, bool)> {
        // the entry holds the shard lock, so insert-or-update is one step
        match self.records.entry((check_in.user_id, check_in.work_date)) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if !record.is_checked_out() {
                    record.apply_check_in(&check_in);
                }
                Ok((record.clone(), false))
            }
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let record = check_in.into_record(id);
                entry.insert(record.clone());
                Ok((record, true))
            }
        }
    }

    async fn get_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.records.get(&(user_id, work_date)).map(|r| r.clone()))
    }

    async fn check_out(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>> {
        let Some(mut record) = self.records.get_mut(&(user_id, work_date)) else {
            return Ok(None);
        };
        if record.check_in_at.is_none() || record.is_checked_out() {
            return Ok(None);
        }

        record.apply_check_out(ip, at);
        Ok(Some(record.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Vec<UserAccount>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.accounts.read().expect("account store poisoned").len()
    }
}

fn visible(account: &UserAccount) -> bool {
    account.deleted_at.is_none()
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        let accounts = self.accounts.read().expect("account store poisoned");
        Ok(accounts
            .iter()
            .find(|a| visible(a) && a.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<UserAccount>> {
        let accounts = self.accounts.read().expect("account store poisoned");
        Ok(accounts.iter().find(|a| visible(a) && a.id == id).cloned())
    }

    async fn exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let accounts = self.accounts.read().expect("account store poisoned");
        Ok(accounts.iter().any(|a| {
            a.username.eq_ignore_ascii_case(username) || a.email.eq_ignore_ascii_case(email)
        }))
    }

    async fn insert(&self, account: NewAccount) -> AppResult<UserAccount> {
        let mut accounts = self.accounts.write().expect("account store poisoned");

        // same guarantee as the unique keys on the users table
        let taken = accounts.iter().any(|a| {
            a.username.eq_ignore_ascii_case(&account.username)
                || a.email.eq_ignore_ascii_case(&account.email)
        });
        if taken {
            return Err(AppError::Conflict("username or email already exists".to_string()));
        }

        let now = Utc::now();
        let stored = UserAccount {
            id: accounts.len() as u64 + 1,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            phone: account.phone,
            password_hash: account.password_hash,
            role: account.role,
            is_active: true,
            last_login_at: None,
            failed_login: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        accounts.push(stored.clone());

        Ok(stored)
    }

    async fn record_failed_login(&self, id: u64) -> AppResult<()> {
        let mut accounts = self.accounts.write().expect("account store poisoned");
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            account.failed_login += 1;
        }
        Ok(())
    }

    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> AppResult<()> {
        let mut accounts = self.accounts.write().expect("account store poisoned");
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }
}
