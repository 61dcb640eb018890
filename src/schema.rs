//! Schema facade: compile a blueprint for the database's dialect and run it.
//!
//! ```no_run
//! use schemata::engine::Database;
//!
//! # fn main() -> schemata::error::SchemaResult<()> {
//! let db = Database::connect("sqlite://app.db")?;
//! let schema = db.schema();
//!
//! schema.create("users", |table| {
//!     table.uuid("id").primary();
//!     table.string("name");
//! })?;
//! schema.modify("users", |table| {
//!     table.integer("age").after("name").nullable();
//! })?;
//! # Ok(())
//! # }
//! ```

use crate::blueprint::Blueprint;
use crate::engine::Database;
use crate::error::SchemaResult;
use crate::grammar::Grammar;

/// DDL operations against one database.
#[derive(Debug, Clone)]
pub struct Schema {
    db: Database,
}

impl Schema {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn grammar(&self) -> &'static dyn Grammar {
        self.db.grammar()
    }

    /// Create a table from the columns declared in `define`.
    pub fn create<F>(&self, table: &str, define: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        define(&mut blueprint);
        self.execute(&self.grammar().compile_create_table(&blueprint))
    }

    /// Add the columns declared in `define`, one statement per column.
    ///
    /// Stops at the first failing column; columns added before it stay.
    pub fn modify<F>(&self, table: &str, define: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        define(&mut blueprint);
        for statement in self.grammar().compile_add_columns(&blueprint) {
            self.execute(&statement)?;
        }
        Ok(())
    }

    pub fn drop(&self, table: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_drop_table(table))
    }

    pub fn drop_column(&self, table: &str, column: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_drop_column(table, column))
    }

    pub fn rename_column(&self, table: &str, from: &str, to: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_rename_column(table, from, to))
    }

    pub fn rename_table(&self, from: &str, to: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_rename_table(from, to))
    }

    pub fn create_index(&self, table: &str, columns: &[&str], index: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_create_index(table, columns, index, false))
    }

    pub fn create_unique_index(
        &self,
        table: &str,
        columns: &[&str],
        index: &str,
    ) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_create_index(table, columns, index, true))
    }

    pub fn drop_index(&self, index: &str) -> SchemaResult<()> {
        self.execute(&self.grammar().compile_drop_index(index))
    }

    /// Run a raw statement.
    pub fn execute(&self, sql: &str) -> SchemaResult<()> {
        tracing::debug!(dialect = %self.db.dialect(), sql, "schema statement");
        self.db.execute(sql).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::RecordingExecutor;
    use crate::error::SchemaError;
    use crate::grammar::Dialect;
    use pretty_assertions::assert_eq;

    fn schema(executor: &Arc<RecordingExecutor>, dialect: Dialect) -> Schema {
        Database::new(executor.clone(), dialect).schema()
    }

    #[test]
    fn test_create_runs_compiled_table() {
        let executor = Arc::new(RecordingExecutor::default());
        schema(&executor, Dialect::Sqlite)
            .create("users", |table| {
                table.uuid("id").primary();
                table.string("name");
            })
            .unwrap();

        assert_eq!(
            *executor.statements.lock().unwrap(),
            vec!["CREATE TABLE IF NOT EXISTS users (\n  id TEXT PRIMARY KEY NOT NULL,\n  name TEXT NOT NULL\n);"]
        );
    }

    #[test]
    fn test_modify_stops_at_first_failure() {
        let executor = Arc::new(RecordingExecutor::failing_on("ADD COLUMN nickname"));
        let err = schema(&executor, Dialect::MySql)
            .modify("users", |table| {
                table.integer("age").after("name").nullable();
                table.string("nickname");
                table.boolean("active").default(true);
            })
            .unwrap_err();

        assert!(matches!(err, SchemaError::Execution { .. }));
        assert_eq!(
            *executor.statements.lock().unwrap(),
            vec![
                "ALTER TABLE users ADD COLUMN age INT AFTER name",
                "ALTER TABLE users ADD COLUMN nickname VARCHAR(255) NOT NULL",
            ]
        );
    }

    #[test]
    fn test_helper_statements() {
        let executor = Arc::new(RecordingExecutor::default());
        let schema = schema(&executor, Dialect::Postgres);

        schema.drop_column("users", "age").unwrap();
        schema.rename_column("users", "name", "full_name").unwrap();
        schema.rename_table("users", "members").unwrap();
        schema.create_index("members", &["email"], "idx_members_email").unwrap();
        schema.create_unique_index("members", &["slug", "org"], "uq_members_slug").unwrap();
        schema.drop_index("idx_members_email").unwrap();
        schema.drop("members").unwrap();

        assert_eq!(
            *executor.statements.lock().unwrap(),
            vec![
                "ALTER TABLE users DROP COLUMN age",
                "ALTER TABLE users RENAME COLUMN name TO full_name",
                "ALTER TABLE users RENAME TO members",
                "CREATE INDEX idx_members_email ON members (email)",
                "CREATE UNIQUE INDEX uq_members_slug ON members (slug, org)",
                "DROP INDEX IF EXISTS idx_members_email",
                "DROP TABLE IF EXISTS members",
            ]
        );
    }

    #[test]
    fn test_create_against_sqlite() {
        let db = Database::connect("sqlite::memory:").unwrap();
        let schema = db.schema();

        schema
            .create("users", |table| {
                table.integer("id").primary().auto_increment();
                table.string("name");
            })
            .unwrap();
        schema
            .modify("users", |table| {
                table.integer("age").nullable();
            })
            .unwrap();
        db.execute("INSERT INTO users (name, age) VALUES ('ada', 36)").unwrap();

        let rows = db.fetch_all("SELECT id, name, age FROM users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["age"], serde_json::json!(36));

        schema.drop("users").unwrap();
        assert!(db.fetch_all("SELECT id FROM users").is_err());
    }
}
