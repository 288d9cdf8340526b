use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use super::AccountStore;
use crate::{
    error::{AppError, AppResult},
    model::user::{NewAccount, UserAccount, UserSql},
};

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, email, full_name, phone, password_hash, role, is_active,
           last_login_at, failed_login, created_at, updated_at, deleted_at
    FROM users
"#;

#[derive(Clone)]
pub struct MySqlAccountStore {
    pool: MySqlPool,
}

impl MySqlAccountStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for MySqlAccountStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserSql>(&format!(
            "{SELECT_COLUMNS} WHERE LOWER(username) = LOWER(?) AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(UserAccount::try_from)
        .transpose()
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserSql>(&format!(
            "{SELECT_COLUMNS} WHERE id = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(UserAccount::try_from)
        .transpose()
    }

    async fn exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(1) FROM users WHERE LOWER(username) = LOWER(?) OR LOWER(email) = LOWER(?)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn insert(&self, account: NewAccount) -> AppResult<UserAccount> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users
              (username, email, full_name, phone, password_hash, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, TRUE, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(account.role.as_ref())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
                return Err(AppError::Conflict("username or email already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("user {id} vanished after insert")))
    }

    async fn record_failed_login(&self, id: u64) -> AppResult<()> {
        sqlx::query("UPDATE users SET failed_login = failed_login + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
