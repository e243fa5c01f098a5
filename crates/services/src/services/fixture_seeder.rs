//! Destructive attendance reset: wipe every attendance row, then regenerate
//! one row per eligible user per working day of a date interval.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use chrono::NaiveDate;
use db::models::{
    attendance::{Attendance, AttendanceStatus, CreateAttendance},
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use utils::dates::DateInterval;
use uuid::Uuid;

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();
pub const DEFAULT_START: NaiveDate = ymd(2025, 1, 1);
pub const DEFAULT_END: NaiveDate = ymd(2025, 10, 16);

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage rejected request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum FixtureSeederError {
    #[error("attendance reset was not confirmed")]
    NotConfirmed,
    #[error("failed to load users: {0}")]
    ListEntities(#[source] StoreError),
    #[error("failed to delete existing attendance: {0}")]
    DeleteExisting(#[source] StoreError),
    #[error(
        "batch {} of {batches} failed with {persisted}/{total} records persisted: {source}",
        .batch_index + 1
    )]
    PartialBatch {
        /// Zero-based index of the first batch that failed
        batch_index: usize,
        batches: usize,
        /// Records written by the batches before the failing one
        persisted: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
}

/// The slice of a user the seeder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for SeedEntity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Storage the seeder writes through.
#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// Every user, minus those holding `excluded_role`, in a stable order.
    async fn list_entities(
        &self,
        excluded_role: Option<UserRole>,
    ) -> Result<Vec<SeedEntity>, StoreError>;

    /// Drop every attendance row. Returns how many were removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Persist one batch; all of it or none of it.
    async fn insert_batch(&self, records: &[CreateAttendance]) -> Result<(), StoreError>;
}

/// [`FixtureStore`] backed by the application database.
#[derive(Clone)]
pub struct SqliteFixtureStore {
    pool: SqlitePool,
}

impl SqliteFixtureStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FixtureStore for SqliteFixtureStore {
    async fn list_entities(
        &self,
        excluded_role: Option<UserRole>,
    ) -> Result<Vec<SeedEntity>, StoreError> {
        let users = match excluded_role {
            Some(role) => User::find_excluding_role(&self.pool, role).await?,
            None => User::find_all(&self.pool).await?,
        };
        Ok(users.into_iter().map(SeedEntity::from).collect())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        Ok(Attendance::delete_all(&self.pool).await?)
    }

    async fn insert_batch(&self, records: &[CreateAttendance]) -> Result<(), StoreError> {
        Attendance::insert_batch(&self.pool, records).await?;
        Ok(())
    }
}

/// Parameters for one reset run. Nothing here is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub interval: DateInterval,
    pub excluded_role: Option<UserRole>,
    pub status: AttendanceStatus,
    pub batch_size: NonZeroUsize,
    /// The operator agreed to the destructive delete
    pub confirmed: bool,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            interval: DateInterval::new(DEFAULT_START, DEFAULT_END),
            excluded_role: Some(UserRole::Candidate),
            status: AttendanceStatus::Present,
            batch_size: DEFAULT_BATCH_SIZE,
            confirmed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub interval: DateInterval,
    pub entities_processed: usize,
    pub records_deleted: u64,
    pub records_created: usize,
    pub batches_written: usize,
}

/// Emitted after every batch that lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch_index: usize,
    pub batches: usize,
    pub persisted: usize,
    pub total: usize,
}

/// One record per entity per working day, entity-major and date-ascending.
pub fn build_records(
    entities: &[SeedEntity],
    interval: DateInterval,
    status: AttendanceStatus,
) -> Vec<CreateAttendance> {
    entities
        .iter()
        .flat_map(|entity| {
            interval.working_days().map(move |date| CreateAttendance {
                user_id: entity.id,
                date,
                status,
            })
        })
        .collect()
}

pub struct FixtureSeeder<S> {
    store: S,
}

impl<S: FixtureStore> FixtureSeeder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self, plan: &SeedPlan) -> Result<SeedReport, FixtureSeederError> {
        self.run_with_progress(plan, |_| {}).await
    }

    /// Delete, regenerate and persist in order. Batches are written one at a
    /// time; the first failure stops the run and leaves earlier batches in
    /// place.
    pub async fn run_with_progress<F>(
        &self,
        plan: &SeedPlan,
        mut on_batch: F,
    ) -> Result<SeedReport, FixtureSeederError>
    where
        F: FnMut(BatchProgress),
    {
        if !plan.confirmed {
            return Err(FixtureSeederError::NotConfirmed);
        }

        info!(
            interval = %plan.interval,
            excluded_role = ?plan.excluded_role,
            status = %plan.status,
            batch_size = plan.batch_size.get(),
            "Starting attendance reset"
        );

        let entities = self
            .store
            .list_entities(plan.excluded_role)
            .await
            .map_err(FixtureSeederError::ListEntities)?;
        info!(users = entities.len(), "Loaded eligible users");

        let records_deleted = self
            .store
            .delete_all()
            .await
            .map_err(FixtureSeederError::DeleteExisting)?;
        info!(records_deleted, "Deleted existing attendance");

        for entity in &entities {
            debug!(user_id = %entity.id, name = %entity.name, email = %entity.email, "Generating attendance");
        }

        let records = build_records(&entities, plan.interval, plan.status);
        let total = records.len();

        if entities.is_empty() {
            warn!("No eligible users; attendance table left empty");
        } else if total == 0 {
            warn!(interval = %plan.interval, "No working days in interval; attendance table left empty");
        }

        let batches = total.div_ceil(plan.batch_size.get());
        let mut persisted = 0;

        for (batch_index, batch) in records.chunks(plan.batch_size.get()).enumerate() {
            self.store.insert_batch(batch).await.map_err(|source| {
                FixtureSeederError::PartialBatch {
                    batch_index,
                    batches,
                    persisted,
                    total,
                    source,
                }
            })?;

            persisted += batch.len();
            debug!(batch = batch_index + 1, batches, persisted, total, "Inserted batch");
            on_batch(BatchProgress {
                batch_index,
                batches,
                persisted,
                total,
            });
        }

        info!(
            users = entities.len(),
            records_created = persisted,
            batches,
            "Attendance reset complete"
        );

        Ok(SeedReport {
            interval: plan.interval,
            entities_processed: entities.len(),
            records_deleted,
            records_created: persisted,
            batches_written: batches,
        })
    }
}
