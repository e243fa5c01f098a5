//! Removes a single day's attendance so the day can be marked again.

use chrono::NaiveDate;
use db::models::attendance::Attendance;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AttendanceCleanupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct AttendanceCleanup {
    pool: SqlitePool,
}

impl AttendanceCleanup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete every row dated `date`. Zero rows is a normal outcome.
    pub async fn remove_for_date(&self, date: NaiveDate) -> Result<u64, AttendanceCleanupError> {
        let removed = Attendance::delete_by_date(&self.pool, date).await?;
        if removed == 0 {
            info!(%date, "No attendance recorded for date, nothing to remove");
        } else {
            info!(%date, removed, "Removed attendance for date");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            attendance::{AttendanceStatus, CreateAttendance},
            user::{CreateUser, User, UserRole},
        },
    };

    use super::*;

    #[tokio::test]
    async fn test_remove_for_date() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = User::create(
            &db.pool,
            &CreateUser {
                name: "Kai".to_string(),
                email: "kai@example.com".to_string(),
                role: UserRole::Manager,
                department: None,
            },
        )
        .await
        .unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 4, 8).unwrap();
        let records: Vec<_> = [monday, tuesday]
            .into_iter()
            .map(|date| CreateAttendance {
                user_id: user.id,
                date,
                status: AttendanceStatus::Present,
            })
            .collect();
        Attendance::insert_batch(&db.pool, &records).await.unwrap();

        let cleanup = AttendanceCleanup::new(db.pool.clone());
        assert_eq!(cleanup.remove_for_date(tuesday).await.unwrap(), 1);
        assert_eq!(cleanup.remove_for_date(tuesday).await.unwrap(), 0);
        assert_eq!(Attendance::find_by_date(&db.pool, monday).await.unwrap().len(), 1);
    }
}
