use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    OnLeave,
}

/// One employee's attendance for one work date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    /// 0 for a placeholder that was never stored
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_at: Option<DateTime<Utc>>,
    #[schema(example = json!(-6.2))]
    pub check_in_lat: Option<f64>,
    #[schema(example = 106.8)]
    pub check_in_lng: Option<f64>,
    pub check_in_photo_url: Option<String>,
    #[schema(example = "10.0.0.7")]
    pub check_in_ip: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_at: Option<DateTime<Utc>>,
    pub check_out_ip: Option<String>,

    #[schema(example = 480)]
    pub total_minutes: i32,
    pub status: AttendanceStatus,
    #[schema(example = "field work")]
    pub activity: String,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Stand-in for a day without a check-in yet.
    pub fn placeholder(user_id: u64, work_date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            work_date,
            check_in_at: None,
            check_in_lat: None,
            check_in_lng: None,
            check_in_photo_url: None,
            check_in_ip: None,
            check_out_at: None,
            check_out_ip: None,
            total_minutes: 0,
            status: AttendanceStatus::Absent,
            activity: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.check_out_at.is_some()
    }

    /// Coalesces a repeated check-in into an open record.
    ///
    /// `check_in_at` is only filled when it was never set; location, photo and
    /// address are only replaced by values that are actually present.
    pub fn apply_check_in(&mut self, check_in: &NewCheckIn) {
        self.check_in_at = self.check_in_at.or(Some(check_in.at));
        self.check_in_lat = check_in.lat.or(self.check_in_lat);
        self.check_in_lng = check_in.lng.or(self.check_in_lng);
        if check_in.photo_url.is_some() {
            self.check_in_photo_url = check_in.photo_url.clone();
        }
        if check_in.ip.is_some() {
            self.check_in_ip = check_in.ip.clone();
        }
        self.status = check_in.status;
        self.activity = check_in.activity.clone();
        self.updated_at = Some(check_in.at);
    }

    pub fn apply_check_out(&mut self, ip: Option<String>, at: DateTime<Utc>) {
        self.check_out_at = Some(at);
        self.check_out_ip = ip;
        self.total_minutes = worked_minutes(self.check_in_at, at);
        self.updated_at = Some(at);
    }
}

/// Input of a check-in upsert.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub user_id: u64,
    pub work_date: NaiveDate,
    pub at: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub photo_url: Option<String>,
    pub ip: Option<String>,
    pub status: AttendanceStatus,
    pub activity: String,
}

impl NewCheckIn {
    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            user_id: self.user_id,
            work_date: self.work_date,
            check_in_at: Some(self.at),
            check_in_lat: self.lat,
            check_in_lng: self.lng,
            check_in_photo_url: self.photo_url,
            check_in_ip: self.ip,
            check_out_at: None,
            check_out_ip: None,
            total_minutes: 0,
            status: self.status,
            activity: self.activity,
            created_at: Some(self.at),
            updated_at: Some(self.at),
        }
    }
}

/// Whole minutes between check-in and check-out, never negative.
pub fn worked_minutes(check_in_at: Option<DateTime<Utc>>, check_out_at: DateTime<Utc>) -> i32 {
    check_in_at
        .map(|start| (check_out_at - start).num_minutes().clamp(0, i32::MAX as i64) as i32)
        .unwrap_or(0)
}

/// Row shape of the `attendances` table.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    pub work_date: NaiveDate,
    pub check_in_at: Option<DateTime<Utc>>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_in_photo_url: Option<String>,
    pub check_in_ip: Option<String>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub check_out_ip: Option<String>,
    pub total_minutes: i32,
    pub status: String,
    pub activity: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status)
            .map_err(|_| AppError::Internal(format!("unknown attendance status {:?}", row.status)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            work_date: row.work_date,
            check_in_at: row.check_in_at,
            check_in_lat: row.check_in_lat,
            check_in_lng: row.check_in_lng,
            check_in_photo_url: row.check_in_photo_url,
            check_in_ip: row.check_in_ip,
            check_out_at: row.check_out_at,
            check_out_ip: row.check_out_ip,
            total_minutes: row.total_minutes,
            status,
            activity: row.activity,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}
