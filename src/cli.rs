//! Embeddable command runner.
//!
//! Call [`run`] from your own binary with the migrations it should manage:
//!
//! ```no_run
//! use schemata::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut registry = Registry::new();
//!     registry.add(
//!         "create_users_table",
//!         |schema: &Schema| schema.create("users", |t| {
//!             t.uuid("id").primary();
//!             t.string("name");
//!         }),
//!         |schema: &Schema| schema.drop("users"),
//!     )?;
//!     schemata::cli::run(&registry)
//! }
//! ```
//!
//! ```bash
//! app migrate --database-url sqlite://app.db?mode=rwc
//! app rollback --step 2
//! app status
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::grammar::Dialect;
use crate::migration::Registry;
use crate::migrator::{MigrationStatus, Migrator, Status};
use crate::progress::ConsoleObserver;

const TABLE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "schemata")]
#[command(about = "Apply and roll back schema migrations", long_about = None)]
#[command(after_help = "EXAMPLES:
    app migrate --database-url postgres://localhost/app
    app rollback --step 2
    DB_DRIVER=sqlite DB_DSN=./app.db app status")]
pub struct Cli {
    /// Database connection URL
    #[arg(long, env = "SCHEMATA_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// SQL dialect, when it cannot be inferred from the URL
    #[arg(long, global = true)]
    pub dialect: Option<Dialect>,

    /// Path to a schemata.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the migrations table
    Init,
    /// Run all pending migrations
    #[command(alias = "up")]
    Migrate,
    /// Roll back the last batches of migrations
    Rollback {
        /// Number of batches to roll back
        #[arg(short, long, default_value_t = 1)]
        step: i64,
    },
    /// Show which migrations have run
    Status,
    /// Roll back every migration
    Reset,
    /// Drop all tables and migrate from scratch
    Fresh,
    /// Print the migrations table
    Ledger,
}

/// Parse the process arguments and run the command.
pub fn run(registry: &Registry) -> anyhow::Result<()> {
    run_from(std::env::args_os(), registry)
}

pub fn run_from<I, T>(args: I, registry: &Registry) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    execute(Cli::parse_from(args), registry)
}

/// Run an already parsed command.
pub fn execute(cli: Cli, registry: &Registry) -> anyhow::Result<()> {
    init_tracing(cli.verbose);

    let mut config = Config::from_env(cli.config.as_deref()).context("failed to load config")?;
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
        config.database.dialect = None;
    }
    if let Some(dialect) = cli.dialect {
        config.database.dialect = Some(dialect);
    }

    let db = config.connect().context("failed to connect to database")?;
    println!("{} {}", "Dialect:".dimmed(), db.dialect());

    let migrator = Migrator::with_config(db, config.migrations).observer(ConsoleObserver);
    migrator.init()?;

    match cli.command {
        Command::Init => {
            println!(
                "{} Migrations table {} is ready",
                "✓".green(),
                migrator.ledger().table().cyan()
            );
        }
        Command::Migrate => {
            let report = migrator.migrate(registry)?;
            if let Some(batch) = report.batch {
                println!(
                    "{} {} migration(s) in batch {}",
                    "✓".green(),
                    report.applied.len(),
                    batch
                );
            }
        }
        Command::Rollback { step } => {
            let report = migrator.rollback(registry, step)?;
            if !report.is_empty() {
                println!("{} {} migration(s) rolled back", "✓".green(), report.rolled_back.len());
            }
        }
        Command::Status => print_status(&migrator.status(registry)?),
        Command::Reset => {
            migrator.reset(registry)?;
        }
        Command::Fresh => {
            let report = migrator.fresh(registry)?;
            println!(
                "{} Dropped {} table(s), applied {} migration(s)",
                "✓".green(),
                report.dropped_tables.len(),
                report.migrate.applied.len()
            );
        }
        Command::Ledger => {
            let entries = migrator.entries()?;
            if entries.is_empty() {
                println!("{}", "(no migrations recorded)".dimmed());
            }
            for entry in entries {
                println!(
                    "{:>4}  {} {:<4} {:<19}  {}",
                    entry.id,
                    "batch".dimmed(),
                    entry.batch,
                    entry.executed_at.as_deref().unwrap_or("-"),
                    entry.migration
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "schemata=debug" } else { "schemata=warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn print_status(statuses: &[MigrationStatus]) {
    let rule = "-".repeat(TABLE_WIDTH);

    println!("{}", rule);
    println!("| {:<8} | {:<45} |", "Status", "Migration");
    println!("{}", rule);
    for entry in statuses {
        // Pad before coloring so escape codes do not count toward the width.
        let label = format!("{:<8}", entry.status);
        let label = match entry.status {
            Status::Ran => label.green(),
            Status::Pending => label.yellow(),
        };
        println!("| {} | {:<45} |", label, entry.name);
    }
    println!("{}", rule);
}
