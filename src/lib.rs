//! # schemata
//!
//! Reversible, batched schema migrations for PostgreSQL, MySQL and SQLite.
//!
//! Tables are declared through a [`Blueprint`](blueprint::Blueprint) and
//! compiled to DDL by the dialect's [`Grammar`](grammar::Grammar). Each
//! [`Migration`](migration::Migration) pairs a forward and a backward action;
//! the [`Migrator`](migrator::Migrator) records what has run in a ledger table
//! and applies pending migrations in batches.
//!
//! ## Quick Example
//!
//! ```
//! use schemata::prelude::*;
//!
//! # fn main() -> SchemaResult<()> {
//! let mut registry = Registry::new();
//! registry.add(
//!     "create_users_table",
//!     |schema: &Schema| {
//!         schema.create("users", |table| {
//!             table.uuid("id").primary();
//!             table.string("name");
//!             table.timestamps();
//!         })
//!     },
//!     |schema: &Schema| schema.drop("users"),
//! )?;
//!
//! let migrator = Migrator::new(Database::connect("sqlite::memory:")?);
//! migrator.init()?;
//!
//! let report = migrator.migrate(&registry)?;
//! assert_eq!(report.batch, Some(1));
//! assert_eq!(migrator.last_batch()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Rendering without a database
//!
//! ```
//! use schemata::blueprint::Blueprint;
//! use schemata::grammar::Dialect;
//!
//! let mut table = Blueprint::new("users");
//! table.integer("id").primary().auto_increment();
//! table.boolean("active").default(true);
//!
//! assert_eq!(
//!     Dialect::Postgres.grammar().compile_create_table(&table),
//!     "CREATE TABLE IF NOT EXISTS users (\n  id SERIAL PRIMARY KEY NOT NULL,\n  active BOOLEAN NOT NULL DEFAULT true\n);"
//! );
//! ```

pub mod blueprint;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod ledger;
pub mod migration;
pub mod migrator;
pub mod parser;
pub mod progress;
pub mod schema;

pub mod prelude {
    pub use crate::blueprint::{Blueprint, ColumnType};
    pub use crate::config::{Config, MigrationsConfig};
    pub use crate::engine::{Database, Executor, SqlxExecutor};
    pub use crate::error::*;
    pub use crate::grammar::{Dialect, Grammar};
    pub use crate::migration::{Migration, Registry};
    pub use crate::migrator::{MigrateReport, Migrator, RollbackReport, Status};
    pub use crate::progress::{ConsoleObserver, Observer, Progress, TracingObserver};
    pub use crate::schema::Schema;
}

pub use engine::Database;
pub use error::{SchemaError, SchemaResult};
pub use migration::{Migration, Registry};
pub use migrator::Migrator;
