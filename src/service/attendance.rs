//! Attendance rules on top of an [`AttendanceStore`].
//!
//! Per user and work date a record moves `no record -> checked in ->
//! checked out`. Repeated check-ins refresh the supplementary fields of an
//! open record; nothing leaves the checked-out state.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::{
    error::{AppError, AppResult},
    model::attendance::{AttendanceRecord, AttendanceStatus, NewCheckIn},
    store::AttendanceStore,
    utils::validation::validate_coordinates,
};

#[derive(Debug, Clone, Default)]
pub struct CheckInRequest {
    pub user_id: u64,
    pub activity: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub photo_url: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckOutRequest {
    pub user_id: u64,
    pub ip: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    offset: FixedOffset,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Calendar date of `now` in business time.
    pub fn work_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Returns the stored record and whether this call created it.
    #[instrument(skip(self, req), fields(user_id = req.user_id))]
    pub async fn check_in(&self, req: CheckInRequest) -> AppResult<(AttendanceRecord, bool)> {
        if req.user_id == 0 {
            return Err(AppError::Unauthorized("missing user identity".to_string()));
        }
        let activity = req.activity.trim();
        if activity.is_empty() {
            return Err(AppError::Validation("activity is required".to_string()));
        }
        validate_coordinates(req.lat, req.lng).map_err(AppError::Validation)?;

        let now = Utc::now();
        let work_date = self.work_date(now);

        let check_in = NewCheckIn {
            user_id: req.user_id,
            work_date,
            at: now,
            lat: req.lat,
            lng: req.lng,
            photo_url: req.photo_url.filter(|url| !url.trim().is_empty()),
            ip: req.ip.filter(|ip| !ip.is_empty()),
            status: AttendanceStatus::Present,
            activity: activity.to_string(),
        };

        let (record, created) = self.store.upsert_check_in(check_in).await?;

        if !created && record.is_checked_out() {
            info!(%work_date, "Check-in rejected, day already closed");
            return Err(AppError::AlreadyCheckedOut);
        }

        info!(%work_date, record_id = record.id, created, "Check-in stored");
        Ok((record, created))
    }

    #[instrument(skip(self, req), fields(user_id = req.user_id))]
    pub async fn check_out(&self, req: CheckOutRequest) -> AppResult<AttendanceRecord> {
        if req.user_id == 0 {
            return Err(AppError::Unauthorized("missing user identity".to_string()));
        }

        let now = Utc::now();
        let work_date = self.work_date(now);

        let current = self
            .store
            .get_by_user_and_date(req.user_id, work_date)
            .await?
            .ok_or(AppError::NotCheckedIn)?;
        if current.is_checked_out() {
            return Err(AppError::AlreadyCheckedOut);
        }

        let ip = req.ip.filter(|ip| !ip.is_empty());
        match self.store.check_out(req.user_id, work_date, ip, now).await? {
            Some(record) => {
                info!(%work_date, record_id = record.id, total_minutes = record.total_minutes, "Check-out stored");
                Ok(record)
            }
            None => {
                // a concurrent check-out closed the record first
                debug!(%work_date, "Check-out lost the race");
                Err(AppError::AlreadyCheckedOut)
            }
        }
    }

    /// Today's record, or an empty placeholder if there is none yet.
    #[instrument(skip(self))]
    pub async fn get_today(&self, user_id: u64) -> AppResult<AttendanceRecord> {
        if user_id == 0 {
            return Err(AppError::Unauthorized("missing user identity".to_string()));
        }

        let work_date = self.work_date(Utc::now());
        let record = self
            .store
            .get_by_user_and_date(user_id, work_date)
            .await?
            .unwrap_or_else(|| AttendanceRecord::placeholder(user_id, work_date));

        Ok(record)
    }
}
