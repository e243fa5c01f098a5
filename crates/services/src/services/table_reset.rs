//! Bulk deletion across the HR tables, children before parents so that
//! foreign keys never block a parent delete.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Every resettable table, in the only order that satisfies the foreign keys.
pub const RESET_ORDER: &[&str] = &[
    "audit_logs",
    "invitation_tokens",
    "password_resets",
    "notifications",
    "leaves",
    "attendance",
    "applications",
    "performance",
    "payroll",
    "events",
    "shifts",
    "documents",
    "jobs",
    "users",
];

#[derive(Debug, Error)]
pub enum TableResetError {
    #[error("table reset was not confirmed")]
    NotConfirmed,
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    Deleted { table: String, rows: u64 },
    Failed { table: String, error: String },
}

impl TableOutcome {
    pub fn table(&self) -> &str {
        match self {
            Self::Deleted { table, .. } | Self::Failed { table, .. } => table,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetReport {
    pub outcomes: Vec<TableOutcome>,
    pub total_deleted: u64,
    pub errors: usize,
}

impl ResetReport {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Reject any name outside [`RESET_ORDER`].
pub fn validate_tables<T: AsRef<str>>(tables: &[T]) -> Result<(), TableResetError> {
    match tables
        .iter()
        .map(|table| table.as_ref())
        .find(|table| !RESET_ORDER.contains(table))
    {
        Some(unknown) => Err(TableResetError::UnknownTable(unknown.to_string())),
        None => Ok(()),
    }
}

pub struct TableResetService {
    pool: SqlitePool,
}

impl TableResetService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn reset_all(&self, confirmed: bool) -> Result<ResetReport, TableResetError> {
        self.reset(RESET_ORDER, confirmed).await
    }

    /// Empty the named tables. They are processed in [`RESET_ORDER`] whatever
    /// order they were passed in. A table that fails is recorded and the
    /// reset moves on to the next one.
    pub async fn reset<T: AsRef<str>>(
        &self,
        tables: &[T],
        confirmed: bool,
    ) -> Result<ResetReport, TableResetError> {
        validate_tables(tables)?;
        if !confirmed {
            return Err(TableResetError::NotConfirmed);
        }

        let selected = RESET_ORDER
            .iter()
            .filter(|table| tables.iter().any(|t| t.as_ref() == **table));

        let mut report = ResetReport::default();
        for table in selected {
            // Table names come from RESET_ORDER only, never from the caller.
            let sql = format!("DELETE FROM {table}");
            match sqlx::query(&sql).execute(&self.pool).await {
                Ok(result) => {
                    let rows = result.rows_affected();
                    info!(table, rows, "Table cleared");
                    report.total_deleted += rows;
                    report.outcomes.push(TableOutcome::Deleted {
                        table: table.to_string(),
                        rows,
                    });
                }
                Err(e) => {
                    warn!(table, error = %e, "Failed to clear table");
                    report.errors += 1;
                    report.outcomes.push(TableOutcome::Failed {
                        table: table.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            tables = report.outcomes.len(),
            total_deleted = report.total_deleted,
            errors = report.errors,
            "Table reset finished"
        );
        Ok(report)
    }
}
