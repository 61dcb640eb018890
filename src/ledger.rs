//! The migration ledger table.
//!
//! One row per applied migration: `id`, `migration`, `batch`, `executed_at`.
//! A name is present exactly while its migration is applied.

use std::collections::HashSet;

use serde::Serialize;

use crate::engine::Database;
use crate::error::{SchemaError, SchemaResult};

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub migration: String,
    pub batch: i64,
    pub executed_at: Option<String>,
}

/// Reads and writes the ledger table.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    table: String,
}

impl Ledger {
    pub fn new(db: Database, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the table if it does not exist.
    pub fn init(&self) -> SchemaResult<()> {
        let sql = self.db.grammar().compile_ledger_table(&self.table);
        self.db.execute(&sql).map(|_| ())
    }

    /// Highest recorded batch, or 0 when the ledger is empty.
    pub fn last_batch(&self) -> SchemaResult<i64> {
        let sql = format!("SELECT MAX(batch) AS last_batch FROM {}", self.table);
        let rows = self.db.fetch_all(&sql)?;
        match rows.first().and_then(|row| row.get("last_batch")) {
            None | Some(serde_json::Value::Null) => Ok(0),
            Some(value) => as_i64("last_batch", value),
        }
    }

    /// Names of every recorded migration.
    pub fn executed(&self) -> SchemaResult<HashSet<String>> {
        let sql = format!("SELECT migration FROM {}", self.table);
        self.db
            .fetch_all(&sql)?
            .iter()
            .map(|row| as_string("migration", row.get("migration")))
            .collect()
    }

    pub fn record(&self, migration: &str, batch: i64) -> SchemaResult<()> {
        let executed_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        let sql = format!(
            "INSERT INTO {} (migration, batch, executed_at) VALUES ({}, {}, {})",
            self.table,
            quote_literal(migration),
            batch,
            quote_literal(&executed_at.to_string())
        );
        self.db.execute(&sql).map(|_| ())
    }

    pub fn remove(&self, migration: &str) -> SchemaResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE migration = {}",
            self.table,
            quote_literal(migration)
        );
        self.db.execute(&sql).map(|_| ())
    }

    /// Migration names in `batch`, most recently recorded first.
    pub fn batch(&self, batch: i64) -> SchemaResult<Vec<String>> {
        let sql = format!(
            "SELECT migration FROM {} WHERE batch = {} ORDER BY id DESC",
            self.table, batch
        );
        self.db
            .fetch_all(&sql)?
            .iter()
            .map(|row| as_string("migration", row.get("migration")))
            .collect()
    }

    /// Every row, oldest first.
    pub fn entries(&self) -> SchemaResult<Vec<LedgerEntry>> {
        let text = match self.db.dialect() {
            crate::grammar::Dialect::MySql => "CHAR",
            _ => "TEXT",
        };
        let sql = format!(
            "SELECT id, migration, batch, CAST(executed_at AS {}) AS executed_at \
             FROM {} ORDER BY id",
            text, self.table
        );

        self.db
            .fetch_all(&sql)?
            .iter()
            .map(|row| {
                let id = row.get("id").unwrap_or(&serde_json::Value::Null);
                let batch = row.get("batch").unwrap_or(&serde_json::Value::Null);
                Ok(LedgerEntry {
                    id: as_i64("id", id)?,
                    migration: as_string("migration", row.get("migration"))?,
                    batch: as_i64("batch", batch)?,
                    executed_at: row
                        .get("executed_at")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                })
            })
            .collect()
    }

    /// Delete every row.
    pub fn clear(&self) -> SchemaResult<()> {
        let sql = format!("DELETE FROM {}", self.table);
        self.db.execute(&sql).map(|_| ())
    }
}

/// Render a string literal, doubling embedded single quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn as_i64(column: &str, value: &serde_json::Value) -> SchemaResult<i64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SchemaError::UnexpectedValue {
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn as_string(column: &str, value: Option<&serde_json::Value>) -> SchemaResult<String> {
    match value {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        other => Err(SchemaError::UnexpectedValue {
            column: column.to_string(),
            value: other.map_or_else(|| "missing".to_string(), |v| v.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger() -> Ledger {
        let ledger = Ledger::new(
            Database::connect("sqlite::memory:").unwrap(),
            "schemata_migrations",
        );
        ledger.init().unwrap();
        ledger
    }

    #[test]
    fn test_init_is_idempotent() {
        let ledger = ledger();
        ledger.init().unwrap();
        assert_eq!(ledger.last_batch().unwrap(), 0);
    }

    #[test]
    fn test_record_and_read_back() {
        let ledger = ledger();
        ledger.record("create_users_table", 1).unwrap();
        ledger.record("create_posts_table", 1).unwrap();
        ledger.record("add_age_to_users", 2).unwrap();

        assert_eq!(ledger.last_batch().unwrap(), 2);
        assert_eq!(
            ledger.batch(1).unwrap(),
            vec!["create_posts_table", "create_users_table"]
        );

        let executed = ledger.executed().unwrap();
        assert_eq!(executed.len(), 3);
        assert!(executed.contains("add_age_to_users"));

        let entries = ledger.entries().unwrap();
        let summary: Vec<(i64, &str, i64)> = entries
            .iter()
            .map(|e| (e.id, e.migration.as_str(), e.batch))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "create_users_table", 1),
                (2, "create_posts_table", 1),
                (3, "add_age_to_users", 2),
            ]
        );
        assert!(entries.iter().all(|e| e.executed_at.is_some()));
    }

    #[test]
    fn test_remove_and_clear() {
        let ledger = ledger();
        ledger.record("a", 1).unwrap();
        ledger.record("b", 1).unwrap();

        ledger.remove("a").unwrap();
        assert_eq!(ledger.batch(1).unwrap(), vec!["b"]);

        ledger.clear().unwrap();
        assert!(ledger.executed().unwrap().is_empty());
        assert_eq!(ledger.last_batch().unwrap(), 0);
    }

    #[test]
    fn test_names_are_escaped() {
        let ledger = ledger();
        ledger.record("o'brien", 1).unwrap();
        assert!(ledger.executed().unwrap().contains("o'brien"));
        ledger.remove("o'brien").unwrap();
        assert!(ledger.executed().unwrap().is_empty());
    }

    #[test]
    fn test_name_is_recorded_at_most_once() {
        let ledger = ledger();
        ledger.record("create_users_table", 1).unwrap();

        let err = ledger.record("create_users_table", 2).unwrap_err();
        assert!(matches!(err, SchemaError::Execution { .. }));
        assert_eq!(ledger.last_batch().unwrap(), 1);
        assert_eq!(ledger.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_value_helpers_reject_unexpected_shapes() {
        assert_eq!(as_i64("batch", &serde_json::json!(3)).unwrap(), 3);
        assert_eq!(as_i64("batch", &serde_json::json!("4")).unwrap(), 4);
        assert!(matches!(
            as_i64("batch", &serde_json::json!(true)),
            Err(SchemaError::UnexpectedValue { .. })
        ));
        assert!(as_string("migration", None).is_err());
    }
}
