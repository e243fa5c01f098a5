use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, EnumString, Display, Default)]
#[sqlx(type_name = "leave_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Leave {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate, // inclusive
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeave {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub reason: Option<String>,
}

impl Leave {
    pub async fn create(pool: &SqlitePool, data: &CreateLeave) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Leave>(
            r#"INSERT INTO leaves (id, user_id, start_date, end_date, status, reason)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, user_id, start_date, end_date, status, reason, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.status)
        .bind(&data.reason)
        .fetch_one(pool)
        .await
    }

    /// Approved leaves whose range includes `date`.
    pub async fn find_approved_covering(
        pool: &SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Leave>(
            r#"SELECT id, user_id, start_date, end_date, status, reason, created_at
               FROM leaves
               WHERE status = 'approved'
                 AND start_date <= $1
                 AND end_date >= $2"#,
        )
        .bind(date)
        .bind(date)
        .fetch_all(pool)
        .await
    }
}
