//! Setup validation: environment, migrations and schema.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Tables the HR application expects to exist.
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "departments",
    "attendance",
    "payroll",
    "performance",
    "jobs",
    "applications",
    "leaves",
    "events",
    "notifications",
    "documents",
];

#[derive(Debug, Error)]
pub enum SetupValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks that the database is initialized and the schema is complete
pub struct SetupValidator {
    pool: SqlitePool,
}

impl SetupValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run every check. `env_vars` pairs a variable name with whether it is set,
    /// so the caller decides where configuration comes from.
    pub async fn validate(
        &self,
        env_vars: &[(&str, bool)],
    ) -> Result<ValidationResult, SetupValidationError> {
        let missing_env_vars: Vec<String> = env_vars
            .iter()
            .filter(|(_, set)| !set)
            .map(|(name, _)| name.to_string())
            .collect();

        // Check if _sqlx_migrations table exists
        let is_initialized = self.table_exists("_sqlx_migrations").await?;
        if !is_initialized {
            warn!("Database not initialized - _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                is_initialized,
                migrations_applied: 0,
                latest_migration: None,
                missing_env_vars,
                missing_tables: REQUIRED_TABLES.iter().map(|t| t.to_string()).collect(),
            });
        }

        let migrations_applied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&self.pool)
                .await?;
        let latest_migration = self.latest_migration().await?;
        let missing_tables = self.missing_tables(REQUIRED_TABLES).await?;

        info!(
            migrations_applied,
            missing_tables = missing_tables.len(),
            missing_env_vars = missing_env_vars.len(),
            "Setup validation complete"
        );

        Ok(ValidationResult {
            is_initialized,
            migrations_applied: migrations_applied as usize,
            latest_migration,
            missing_env_vars,
            missing_tables,
        })
    }

    /// Names from `required_tables` that do not exist
    pub async fn missing_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, SetupValidationError> {
        let mut missing = Vec::new();
        for table in required_tables {
            if !self.table_exists(table).await? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    async fn table_exists(&self, table: &str) -> Result<bool, SetupValidationError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn latest_migration(&self) -> Result<Option<String>, SetupValidationError> {
        let migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(migration)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_env_vars: Vec<String>,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.missing_env_vars.is_empty() && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            return "Database not initialized - migrations need to be run".to_string();
        }

        let mut problems = Vec::new();
        if !self.missing_env_vars.is_empty() {
            problems.push(format!(
                "missing environment variables: {}",
                self.missing_env_vars.join(", ")
            ));
        }
        if !self.missing_tables.is_empty() {
            problems.push(format!("missing tables: {}", self.missing_tables.join(", ")));
        }

        if problems.is_empty() {
            format!("Setup OK - {} migrations applied", self.migrations_applied)
        } else {
            format!("Setup incomplete - {}", problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use db::DBService;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    #[tokio::test]
    async fn test_migrated_database_passes() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = SetupValidator::new(db.pool.clone())
            .validate(&[("DATABASE_URL", true)])
            .await
            .unwrap();

        assert!(result.is_ok(), "{}", result.summary());
        assert_eq!(result.migrations_applied, 1);
        assert_eq!(result.latest_migration.as_deref(), Some("init"));
        assert_eq!(result.summary(), "Setup OK - 1 migrations applied");
    }

    #[tokio::test]
    async fn test_missing_env_var_reported() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = SetupValidator::new(db.pool.clone())
            .validate(&[("DATABASE_URL", true), ("HRMS_ADMIN_EMAIL", false)])
            .await
            .unwrap();

        assert!(!result.is_ok());
        assert_eq!(result.missing_env_vars, vec!["HRMS_ADMIN_EMAIL".to_string()]);
        assert!(result.summary().contains("HRMS_ADMIN_EMAIL"));
    }

    #[tokio::test]
    async fn test_uninitialized_database() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let result = SetupValidator::new(pool).validate(&[]).await.unwrap();

        assert!(!result.is_initialized);
        assert_eq!(result.missing_tables.len(), REQUIRED_TABLES.len());
        assert_eq!(
            result.summary(),
            "Database not initialized - migrations need to be run"
        );
    }

    #[tokio::test]
    async fn test_missing_tables() {
        let db = DBService::new_in_memory().await.unwrap();
        let missing = SetupValidator::new(db.pool.clone())
            .missing_tables(&["users", "timesheets"])
            .await
            .unwrap();
        assert_eq!(missing, vec!["timesheets".to_string()]);
    }
}
