use std::time::Duration;

use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use tracing::info;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
      id            BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
      username      VARCHAR(32)  NOT NULL,
      email         VARCHAR(120) NOT NULL,
      full_name     VARCHAR(120) NOT NULL,
      phone         VARCHAR(32)  NULL,
      password_hash VARCHAR(255) NOT NULL,
      role          VARCHAR(16)  NOT NULL DEFAULT 'EMPLOYEE',
      is_active     BOOLEAN      NOT NULL DEFAULT TRUE,
      last_login_at DATETIME     NULL,
      failed_login  INT UNSIGNED NOT NULL DEFAULT 0,
      created_at    DATETIME     NOT NULL,
      updated_at    DATETIME     NOT NULL,
      deleted_at    DATETIME     NULL,
      UNIQUE KEY uq_users_username (username),
      UNIQUE KEY uq_users_email (email)
    )
"#;

// one row per user and work date
const CREATE_ATTENDANCES: &str = r#"
    CREATE TABLE IF NOT EXISTS attendances (
      id                 BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
      user_id            BIGINT UNSIGNED NOT NULL,
      work_date          DATE         NOT NULL,
      check_in_at        DATETIME     NULL,
      check_in_lat       DOUBLE       NULL,
      check_in_lng       DOUBLE       NULL,
      check_in_photo_url VARCHAR(512) NULL,
      check_in_ip        VARCHAR(64)  NULL,
      check_out_at       DATETIME     NULL,
      check_out_ip       VARCHAR(64)  NULL,
      total_minutes      INT          NOT NULL DEFAULT 0,
      status             VARCHAR(16)  NOT NULL DEFAULT 'PRESENT',
      activity           VARCHAR(255) NOT NULL DEFAULT '',
      created_at         DATETIME     NOT NULL,
      updated_at         DATETIME     NOT NULL,
      UNIQUE KEY uq_attendances_user_date (user_id, work_date)
    )
"#;

/// Creates the tables the stores expect when they are missing.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_ATTENDANCES).execute(pool).await?;

    info!("Database schema ready");
    Ok(())
}
