use std::num::NonZeroUsize;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use db::models::{attendance::AttendanceStatus, user::UserRole};
use services::services::fixture_seeder::{DEFAULT_BATCH_SIZE, DEFAULT_END, DEFAULT_START};

/// Maintenance commands for the HR database.
#[derive(Parser, Debug)]
#[command(name = "hrms-ops", version)]
pub struct Cli {
    /// SQLite connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://hrms.db",
        global = true
    )]
    pub database_url: String,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete all attendance and regenerate it for every working day
    SeedAttendance(SeedArgs),
    /// Delete every row from the HR tables (or only those given with --table)
    ResetTables {
        #[arg(long = "table", value_name = "TABLE")]
        tables: Vec<String>,
    },
    /// Remove one day's attendance (defaults to today)
    ClearAttendance {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark users without attendance as absent or on leave (defaults to today)
    MarkAbsent {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Give an existing user the admin role
    PromoteAdmin {
        #[arg(long)]
        email: String,
    },
    /// Set the department of every user with a role
    SyncDepartment {
        #[arg(long)]
        role: UserRole,
        #[arg(long)]
        department: String,
    },
    /// Check environment, migrations and tables
    Validate,
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long, default_value_t = DEFAULT_START)]
    pub start: NaiveDate,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long, default_value_t = DEFAULT_END)]
    pub end: NaiveDate,

    /// Status stamped on every generated row
    #[arg(long, default_value_t = AttendanceStatus::Present)]
    pub status: AttendanceStatus,

    /// Rows per insert statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: NonZeroUsize,

    /// Role left out of the reset
    #[arg(long, default_value_t = UserRole::Candidate, conflicts_with = "include_all")]
    pub exclude_role: UserRole,

    /// Generate rows for every user, candidates included
    #[arg(long)]
    pub include_all: bool,
}

impl SeedArgs {
    pub fn excluded_role(&self) -> Option<UserRole> {
        (!self.include_all).then_some(self.exclude_role)
    }
}
