//! End-of-day job: everyone who has not recorded attendance for a working day
//! is marked absent, or on leave when an approved leave covers the day.

use std::collections::HashSet;

use chrono::NaiveDate;
use db::models::{
    attendance::{Attendance, AttendanceStatus, CreateAttendance},
    leave::Leave,
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use utils::dates::is_weekend;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AbsenceMarkerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReport {
    pub date: Option<NaiveDate>,
    pub skipped_weekend: bool,
    pub already_marked: usize,
    pub marked_absent: Vec<Uuid>,
    pub marked_on_leave: Vec<Uuid>,
}

impl MarkReport {
    pub fn records_written(&self) -> usize {
        self.marked_absent.len() + self.marked_on_leave.len()
    }
}

pub struct AbsenceMarker {
    pool: SqlitePool,
}

impl AbsenceMarker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn mark_for_date(&self, date: NaiveDate) -> Result<MarkReport, AbsenceMarkerError> {
        let mut report = MarkReport {
            date: Some(date),
            ..Default::default()
        };

        if is_weekend(date) {
            info!(%date, "Skipping absence marking on a weekend");
            report.skipped_weekend = true;
            return Ok(report);
        }

        let users = User::find_excluding_role(&self.pool, UserRole::Candidate).await?;
        let marked: HashSet<Uuid> = Attendance::find_by_date(&self.pool, date)
            .await?
            .into_iter()
            .map(|a| a.user_id)
            .collect();
        let on_leave: HashSet<Uuid> = Leave::find_approved_covering(&self.pool, date)
            .await?
            .into_iter()
            .map(|l| l.user_id)
            .collect();

        debug!(
            users = users.len(),
            marked = marked.len(),
            on_leave = on_leave.len(),
            "Absence marking inputs"
        );

        let mut records = Vec::new();
        for user in users {
            if marked.contains(&user.id) {
                report.already_marked += 1;
                continue;
            }
            let status = if on_leave.contains(&user.id) {
                report.marked_on_leave.push(user.id);
                AttendanceStatus::OnLeave
            } else {
                report.marked_absent.push(user.id);
                AttendanceStatus::Absent
            };
            records.push(CreateAttendance {
                user_id: user.id,
                date,
                status,
            });
        }

        if records.is_empty() {
            info!(%date, "Everyone has attendance for the day, nothing to mark");
            return Ok(report);
        }

        Attendance::insert_batch(&self.pool, &records).await?;
        info!(
            %date,
            absent = report.marked_absent.len(),
            on_leave = report.marked_on_leave.len(),
            "Marked missing attendance"
        );

        Ok(report)
    }
}
