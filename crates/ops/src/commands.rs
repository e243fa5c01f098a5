use anyhow::{Context, bail};
use chrono::NaiveDate;
use db::DBService;
use indicatif::{ProgressBar, ProgressStyle};
use services::services::{
    absence_marker::AbsenceMarker,
    attendance_cleanup::AttendanceCleanup,
    fixture_seeder::{FixtureSeeder, FixtureSeederError, SeedPlan, SqliteFixtureStore},
    setup_validator::SetupValidator,
    table_reset::{
        RESET_ORDER, TableOutcome, TableResetError, TableResetService, validate_tables,
    },
    user_admin::UserAdmin,
};
use tracing::error;
use utils::dates::{DateInterval, today};

use crate::{
    cli::{Cli, Command, SeedArgs},
    prompt::{confirm, confirm_phrase},
};

/// Environment the HR stack cannot run without.
const REQUIRED_ENV_VARS: &[&str] = &["DATABASE_URL"];

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Validate => validate(&cli.database_url).await,
        Command::SeedAttendance(args) => {
            let db = open(&cli.database_url).await?;
            seed_attendance(&db, &args, cli.yes).await
        }
        Command::ResetTables { tables } => {
            let db = open(&cli.database_url).await?;
            reset_tables(&db, tables, cli.yes).await
        }
        Command::ClearAttendance { date } => {
            let db = open(&cli.database_url).await?;
            clear_attendance(&db, date.unwrap_or_else(today), cli.yes).await
        }
        Command::MarkAbsent { date } => {
            let db = open(&cli.database_url).await?;
            mark_absent(&db, date.unwrap_or_else(today)).await
        }
        Command::PromoteAdmin { email } => {
            let db = open(&cli.database_url).await?;
            let user = UserAdmin::new(db.pool.clone()).promote_to_admin(&email).await?;
            println!("{} ({}) is now an admin", user.name, user.email);
            Ok(())
        }
        Command::SyncDepartment { role, department } => {
            let db = open(&cli.database_url).await?;
            let users = UserAdmin::new(db.pool.clone())
                .sync_department_for_role(role, &department)
                .await?;
            for user in &users {
                println!("  {} ({}) -> {}", user.name, user.email, department);
            }
            println!("Updated {} {} user(s)", users.len(), role);
            Ok(())
        }
    }
}

async fn open(database_url: &str) -> anyhow::Result<DBService> {
    DBService::new(database_url)
        .await
        .with_context(|| format!("failed to open database at {database_url}"))
}

async fn seed_attendance(db: &DBService, args: &SeedArgs, yes: bool) -> anyhow::Result<()> {
    let interval = DateInterval::new(args.start, args.end);
    let confirmed = confirm(
        yes,
        &format!(
            "Delete ALL attendance and regenerate \"{}\" rows for {}?",
            args.status, interval
        ),
    )?;
    let plan = SeedPlan {
        interval,
        excluded_role: args.excluded_role(),
        status: args.status,
        batch_size: args.batch_size,
        confirmed,
    };

    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} [{bar:40}] {pos}/{len} records",
    )?);

    let seeder = FixtureSeeder::new(SqliteFixtureStore::new(db.pool.clone()));
    let result = seeder
        .run_with_progress(&plan, |progress| {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.persisted as u64);
        })
        .await;
    bar.finish_and_clear();

    match result {
        Ok(report) => {
            println!("Attendance reset complete");
            println!("  Users processed:  {}", report.entities_processed);
            println!("  Date range:       {}", report.interval);
            println!("  Records removed:  {}", report.records_deleted);
            println!("  Records created:  {}", report.records_created);
            println!("  Status:           {}", plan.status);
            Ok(())
        }
        Err(FixtureSeederError::NotConfirmed) => {
            println!("Operation cancelled.");
            Ok(())
        }
        Err(e) => {
            if let FixtureSeederError::PartialBatch { .. } = e {
                error!("Attendance is partially populated; re-run to start over");
            }
            Err(e).context("attendance reset failed")
        }
    }
}

async fn reset_tables(db: &DBService, tables: Vec<String>, yes: bool) -> anyhow::Result<()> {
    let tables = if tables.is_empty() {
        RESET_ORDER.iter().map(|t| t.to_string()).collect()
    } else {
        tables
    };
    validate_tables(tables.as_slice())?;
    println!("This will delete every row from: {}", tables.join(", "));
    let confirmed = confirm_phrase(yes, "This cannot be undone.", "DELETE ALL")?;

    let report = match TableResetService::new(db.pool.clone())
        .reset(tables.as_slice(), confirmed)
        .await
    {
        Ok(report) => report,
        Err(TableResetError::NotConfirmed) => {
            println!("Operation cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for outcome in &report.outcomes {
        match outcome {
            TableOutcome::Deleted { table, rows: 0 } => println!("  {table}: empty"),
            TableOutcome::Deleted { table, rows } => println!("  {table}: deleted {rows} records"),
            TableOutcome::Failed { table, error } => println!("  {table}: FAILED ({error})"),
        }
    }
    println!(
        "Deleted {} records across {} tables, {} error(s)",
        report.total_deleted,
        report.outcomes.len(),
        report.errors
    );

    if !report.is_clean() {
        bail!("{} table(s) could not be cleared", report.errors);
    }
    Ok(())
}

async fn clear_attendance(db: &DBService, date: NaiveDate, yes: bool) -> anyhow::Result<()> {
    if !confirm(yes, &format!("Remove all attendance recorded on {date}?"))? {
        println!("Operation cancelled.");
        return Ok(());
    }
    let removed = AttendanceCleanup::new(db.pool.clone())
        .remove_for_date(date)
        .await?;
    println!("Removed {removed} attendance record(s) for {date}");
    Ok(())
}

async fn mark_absent(db: &DBService, date: NaiveDate) -> anyhow::Result<()> {
    let report = AbsenceMarker::new(db.pool.clone()).mark_for_date(date).await?;
    if report.skipped_weekend {
        println!("{date} is a weekend, nothing to mark");
        return Ok(());
    }
    println!("Attendance for {date}");
    println!("  Already recorded: {}", report.already_marked);
    println!("  Marked absent:    {}", report.marked_absent.len());
    println!("  Marked on leave:  {}", report.marked_on_leave.len());
    Ok(())
}

async fn validate(database_url: &str) -> anyhow::Result<()> {
    let env_vars: Vec<(&str, bool)> = REQUIRED_ENV_VARS
        .iter()
        .map(|name| (*name, std::env::var_os(name).is_some()))
        .collect();

    let db = DBService::connect_existing(database_url)
        .await
        .with_context(|| format!("database connection failed: {database_url}"))?;
    let result = SetupValidator::new(db.pool.clone()).validate(&env_vars).await?;

    for (name, set) in &env_vars {
        println!("  {name}: {}", if *set { "set" } else { "NOT SET" });
    }
    println!("  migrations applied: {}", result.migrations_applied);
    if let Some(latest) = &result.latest_migration {
        println!("  latest migration:   {latest}");
    }
    for table in &result.missing_tables {
        println!("  table {table}: MISSING");
    }
    println!("{}", result.summary());

    if !result.is_ok() {
        bail!("setup validation failed");
    }
    Ok(())
}
