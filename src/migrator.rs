//! Migration orchestration.
//!
//! The [`Migrator`] compares a [`Registry`] against the [`Ledger`] and runs
//! what is missing (or what must be undone), one batch at a time.
//!
//! - `migrate` applies every pending migration, ordered by name, as one new
//!   batch.
//! - `rollback` undoes the last `steps` batches, newest entry first.
//! - `reset` rolls back every batch.
//! - `fresh` drops every table except the ledger, clears the ledger and
//!   migrates from scratch.
//!
//! Runs are fail-fast: the first error stops the run and is returned, and
//! migrations of the batch that already succeeded stay recorded. Set
//! [`MigrationsConfig::compensate_failed_batch`] to undo them instead.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::MigrationsConfig;
use crate::engine::Database;
use crate::error::{SchemaError, SchemaResult};
use crate::ledger::{Ledger, LedgerEntry};
use crate::migration::{Migration, Registry};
use crate::progress::{Observer, Progress, TracingObserver};
use crate::schema::Schema;

/// Outcome of [`Migrator::migrate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrateReport {
    /// The batch number used, or `None` when nothing was pending.
    pub batch: Option<i64>,
    pub applied: Vec<String>,
}

impl MigrateReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Outcome of [`Migrator::rollback`] and [`Migrator::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    /// Rolled back migrations, in the order they were undone.
    pub rolled_back: Vec<String>,
    /// Batches visited, newest first.
    pub batches: Vec<i64>,
}

impl RollbackReport {
    pub fn is_empty(&self) -> bool {
        self.rolled_back.is_empty()
    }
}

/// Outcome of [`Migrator::fresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FreshReport {
    pub dropped_tables: Vec<String>,
    pub migrate: MigrateReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Ran,
    Pending,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ran => write!(f, "Ran"),
            Status::Pending => write!(f, "Pending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub status: Status,
}

/// Applies and reverts migrations against one database.
pub struct Migrator {
    db: Database,
    ledger: Ledger,
    config: MigrationsConfig,
    observer: Arc<dyn Observer>,
}

impl Migrator {
    /// A migrator with the default ledger table and a [`TracingObserver`].
    pub fn new(db: Database) -> Self {
        Self::with_config(db, MigrationsConfig::default())
    }

    pub fn with_config(db: Database, config: MigrationsConfig) -> Self {
        let ledger = Ledger::new(db.clone(), config.table.clone());
        Self {
            db,
            ledger,
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the progress observer.
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &MigrationsConfig {
        &self.config
    }

    fn schema(&self) -> Schema {
        self.db.schema()
    }

    fn notify(&self, event: Progress<'_>) {
        self.observer.notify(&event);
    }

    /// Create the ledger table if it does not exist.
    pub fn init(&self) -> SchemaResult<()> {
        self.ledger
            .init()
            .map_err(|e| SchemaError::context("failed to create migrations table", e))
    }

    /// Highest recorded batch, or 0.
    pub fn last_batch(&self) -> SchemaResult<i64> {
        self.ledger
            .last_batch()
            .map_err(|e| SchemaError::context("failed to get last batch", e))
    }

    pub fn executed_migrations(&self) -> SchemaResult<HashSet<String>> {
        self.ledger
            .executed()
            .map_err(|e| SchemaError::context("failed to get executed migrations", e))
    }

    /// Names recorded in `batch`, newest first.
    pub fn migrations_in_batch(&self, batch: i64) -> SchemaResult<Vec<String>> {
        self.ledger.batch(batch).map_err(|e| {
            SchemaError::context(format!("failed to get migrations from batch {}", batch), e)
        })
    }

    pub fn entries(&self) -> SchemaResult<Vec<LedgerEntry>> {
        self.ledger
            .entries()
            .map_err(|e| SchemaError::context("failed to read migrations table", e))
    }

    pub fn record_migration(&self, name: &str, batch: i64) -> SchemaResult<()> {
        self.ledger
            .record(name, batch)
            .map_err(|e| SchemaError::context(format!("failed to record migration {}", name), e))
    }

    pub fn remove_migration(&self, name: &str) -> SchemaResult<()> {
        self.ledger.remove(name).map_err(|e| {
            SchemaError::context(format!("failed to remove migration record {}", name), e)
        })
    }

    /// Apply every pending migration as one new batch, ordered by name.
    pub fn migrate(&self, registry: &Registry) -> SchemaResult<MigrateReport> {
        let executed = self.executed_migrations()?;
        let batch = self.last_batch()? + 1;

        let mut pending: Vec<&Migration> = registry
            .iter()
            .filter(|m| !executed.contains(m.name()))
            .collect();

        if pending.is_empty() {
            self.notify(Progress::NothingToMigrate);
            return Ok(MigrateReport::default());
        }

        pending.sort_by(|a, b| a.name().cmp(b.name()));

        let schema = self.schema();
        let mut applied: Vec<&Migration> = Vec::with_capacity(pending.len());

        for migration in pending {
            self.notify(Progress::Migrating(migration.name()));

            if let Err(e) = migration.up(&schema) {
                let err = SchemaError::migration(migration.name(), e);
                return Err(self.compensate(&schema, &applied, err));
            }

            if let Err(err) = self.record_migration(migration.name(), batch) {
                applied.push(migration);
                return Err(self.compensate(&schema, &applied, err));
            }

            applied.push(migration);
            self.notify(Progress::Migrated(migration.name()));
        }

        Ok(MigrateReport {
            batch: Some(batch),
            applied: applied.iter().map(|m| m.name().to_string()).collect(),
        })
    }

    /// Undo what a failed batch already applied, when configured to.
    ///
    /// Always hands back `err`; a failure while compensating is logged and
    /// ends compensation.
    fn compensate(
        &self,
        schema: &Schema,
        applied: &[&Migration],
        err: SchemaError,
    ) -> SchemaError {
        if !self.config.compensate_failed_batch {
            return err;
        }

        for migration in applied.iter().rev() {
            self.notify(Progress::Compensating(migration.name()));

            let undone = migration
                .down(schema)
                .and_then(|()| self.remove_migration(migration.name()));
            if let Err(e) = undone {
                tracing::warn!(
                    migration = migration.name(),
                    error = %e,
                    "compensating rollback failed"
                );
                break;
            }

            self.notify(Progress::RolledBack(migration.name()));
        }

        err
    }

    /// Undo the last `steps` batches. `steps <= 0` means one batch.
    pub fn rollback(&self, registry: &Registry, steps: i64) -> SchemaResult<RollbackReport> {
        let steps = if steps <= 0 { 1 } else { steps };

        let last_batch = self.last_batch()?;
        if last_batch == 0 {
            self.notify(Progress::NothingToRollback);
            return Ok(RollbackReport::default());
        }

        let schema = self.schema();
        let mut report = RollbackReport::default();

        for batch in (1..=last_batch).rev().take(steps as usize) {
            report.batches.push(batch);

            for name in self.migrations_in_batch(batch)? {
                let migration = registry
                    .get(&name)
                    .ok_or_else(|| SchemaError::UnresolvedRollbackTarget(name.clone()))?;

                self.notify(Progress::RollingBack(&name));

                migration
                    .down(&schema)
                    .map_err(|e| SchemaError::rollback(name.as_str(), e))?;
                self.remove_migration(&name)?;

                self.notify(Progress::RolledBack(&name));
                report.rolled_back.push(name);
            }
        }

        Ok(report)
    }

    /// Every registered migration, sorted by name, with whether it has run.
    pub fn status(&self, registry: &Registry) -> SchemaResult<Vec<MigrationStatus>> {
        let executed = self.executed_migrations()?;

        Ok(registry
            .names()
            .into_iter()
            .map(|name| MigrationStatus {
                name: name.to_string(),
                status: if executed.contains(name) {
                    Status::Ran
                } else {
                    Status::Pending
                },
            })
            .collect())
    }

    /// Roll back every batch.
    pub fn reset(&self, registry: &Registry) -> SchemaResult<RollbackReport> {
        let last_batch = self.last_batch()?;
        if last_batch == 0 {
            self.notify(Progress::NothingToReset);
            return Ok(RollbackReport::default());
        }
        self.rollback(registry, last_batch)
    }

    /// Drop every table but the ledger, clear the ledger, then migrate.
    pub fn fresh(&self, registry: &Registry) -> SchemaResult<FreshReport> {
        let grammar = self.db.grammar();

        let rows = self
            .db
            .fetch_all(&grammar.compile_list_tables())
            .map_err(|e| SchemaError::context("failed to get tables", e))?;

        let mut dropped_tables = Vec::new();
        for row in rows {
            let Some(table) = row.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            // Postgres and MySQL may report the ledger in a different case.
            if table.eq_ignore_ascii_case(self.ledger.table()) {
                continue;
            }

            self.db
                .execute(&grammar.compile_drop_table(table))
                .map_err(|e| SchemaError::context(format!("failed to drop table {}", table), e))?;
            self.notify(Progress::DroppedTable(table));
            dropped_tables.push(table.to_string());
        }

        self.ledger
            .clear()
            .map_err(|e| SchemaError::context("failed to clear migrations table", e))?;

        Ok(FreshReport {
            dropped_tables,
            migrate: self.migrate(registry)?,
        })
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("db", &self.db)
            .field("ledger", &self.ledger.table())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
