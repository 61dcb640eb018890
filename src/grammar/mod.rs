//! DDL compilation per SQL dialect.
//!
//! Each supported dialect implements [`Grammar`], which turns a
//! [`Blueprint`] into CREATE / ALTER / DROP statements and maps semantic
//! column types to native ones. Pick a grammar through [`Dialect::grammar`].
//!
//! | semantic type  | Postgres  | MySQL        | SQLite  |
//! |----------------|-----------|--------------|---------|
//! | uuid           | UUID      | CHAR(36)     | TEXT    |
//! | string         | VARCHAR(255) | VARCHAR(255) | TEXT |
//! | text           | TEXT      | TEXT         | TEXT    |
//! | integer        | INTEGER / SERIAL | INT   | INTEGER |
//! | big-integer    | BIGINT / BIGSERIAL | BIGINT | INTEGER |
//! | boolean        | BOOLEAN   | TINYINT(1)   | INTEGER |
//! | decimal(p,s)   | DECIMAL(p,s) | DECIMAL(p,s) | REAL |
//! | timestamp      | TIMESTAMP | TIMESTAMP    | TEXT    |
//! | date           | DATE      | DATE         | TEXT    |
//! | json           | JSONB     | JSON         | TEXT    |

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blueprint::{Blueprint, Column, ColumnType, ForeignKey};
use crate::error::SchemaError;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "postgresql", alias = "pgsql")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    pub fn grammar(&self) -> &'static dyn Grammar {
        match self {
            Dialect::Postgres => &PostgresGrammar,
            Dialect::MySql => &MySqlGrammar,
            Dialect::Sqlite => &SqliteGrammar,
        }
    }

    /// Infer the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(SchemaError::Config(format!(
                "Unsupported database driver: '{}'. Expected: postgres, mysql, or sqlite",
                other
            ))),
        }
    }
}

/// Compiles blueprints and helper statements for one dialect.
pub trait Grammar: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Native type for a column.
    fn map_type(&self, column: &Column) -> String;

    fn compile_create_table(&self, blueprint: &Blueprint) -> String;

    /// One `ALTER TABLE .. ADD COLUMN` statement per column, in order.
    fn compile_add_columns(&self, blueprint: &Blueprint) -> Vec<String>;

    fn compile_drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", table)
    }

    fn compile_drop_column(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE {} DROP COLUMN {}", table, column)
    }

    /// Column name as it appears in a column definition.
    fn wrap_column(&self, name: &str) -> String {
        name.to_string()
    }

    fn compile_rename_column(&self, table: &str, from: &str, to: &str) -> String {
        format!("ALTER TABLE {} RENAME COLUMN {} TO {}", table, from, to)
    }

    fn compile_rename_table(&self, from: &str, to: &str) -> String {
        format!("ALTER TABLE {} RENAME TO {}", from, to)
    }

    fn compile_create_index(
        &self,
        table: &str,
        columns: &[&str],
        index: &str,
        unique: bool,
    ) -> String {
        let unique = if unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            index,
            table,
            columns.join(", ")
        )
    }

    fn compile_drop_index(&self, index: &str) -> String {
        format!("DROP INDEX IF EXISTS {}", index)
    }

    /// DDL for the migration ledger table.
    fn compile_ledger_table(&self, table: &str) -> String;

    /// Query returning one `name` column per table in the current schema.
    fn compile_list_tables(&self) -> String;
}

/// ` DEFAULT v`, quoted unless the column type takes a bare literal.
pub(crate) fn default_clause(column: &Column) -> String {
    match &column.default {
        Some(value) if column.column_type.has_unquoted_default() => format!(" DEFAULT {}", value),
        Some(value) => format!(" DEFAULT '{}'", value),
        None => String::new(),
    }
}

/// ` ON DELETE X ON UPDATE Y`, skipping empty actions.
pub(crate) fn foreign_key_actions(foreign_key: &ForeignKey) -> String {
    let mut sql = String::new();
    if !foreign_key.on_delete.is_empty() {
        sql.push_str(&format!(" ON DELETE {}", foreign_key.on_delete.to_uppercase()));
    }
    if !foreign_key.on_update.is_empty() {
        sql.push_str(&format!(" ON UPDATE {}", foreign_key.on_update.to_uppercase()));
    }
    sql
}

/// Assemble a CREATE TABLE statement from indented definitions.
pub(crate) fn create_table_statement(table: &str, definitions: &[String], closing: &str) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", table);
    sql.push_str(&definitions.join(",\n"));
    sql.push('\n');
    sql.push_str(closing);
    sql
}

/// `DECIMAL..` for custom names starting with "decimal", otherwise the name as written.
pub(crate) fn custom_type(name: &str) -> String {
    match name.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("decimal") => format!("DECIMAL{}", &name[7..]),
        _ => name.to_string(),
    }
}

/// Whether a custom type name carries the "decimal" prefix.
pub(crate) fn is_decimal_name(column_type: &ColumnType) -> bool {
    match column_type {
        ColumnType::Decimal { .. } => true,
        ColumnType::Custom(name) => name
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("decimal")),
        _ => false,
    }
}
