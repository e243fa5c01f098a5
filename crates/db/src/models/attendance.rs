use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, EnumString, Display, Default)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    OnLeave,
    HalfDay,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid, // Foreign key to User
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

/// A row to be written; ids are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAttendance {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// SQLite's historical default for SQLITE_MAX_VARIABLE_NUMBER is 999;
/// each attendance row binds four values.
const ROWS_PER_STATEMENT: usize = 999 / 4;

impl Attendance {
    /// Insert `records` inside one transaction, so the batch lands completely
    /// or not at all. Large batches are split across several statements to
    /// stay under SQLite's bound-parameter limit.
    pub async fn insert_batch(
        pool: &SqlitePool,
        records: &[CreateAttendance],
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for chunk in records.chunks(ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO attendance (id, user_id, date, status) ");
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(record.user_id)
                    .push_bind(record.date)
                    .push_bind(record.status);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }

    /// Remove every attendance row regardless of date.
    pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance").execute(pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_date(pool: &SqlitePool, date: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE date = $1")
            .bind(date)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_date(
        pool: &SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"SELECT id, user_id, date, status, created_at
               FROM attendance
               WHERE date = $1
               ORDER BY rowid ASC"#,
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// All rows ordered by user then date.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"SELECT id, user_id, date, status, created_at
               FROM attendance
               ORDER BY user_id ASC, date ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance")
            .fetch_one(pool)
            .await
    }
}
