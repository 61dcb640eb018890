use super::{
    Dialect, Grammar, create_table_statement, default_clause, foreign_key_actions, is_decimal_name,
};
use crate::blueprint::{Blueprint, Column, ColumnType};

/// SQLite grammar.
pub struct SqliteGrammar;

impl SqliteGrammar {
    fn column_definition(&self, column: &Column) -> String {
        let mut def = format!("  {} {}", self.wrap_column(&column.name), self.map_type(column));

        if column.primary {
            def.push_str(" PRIMARY KEY");
            if column.auto_increment {
                def.push_str(" AUTOINCREMENT");
            }
        }
        if !column.nullable {
            def.push_str(" NOT NULL");
        }
        if column.unique && !column.primary {
            def.push_str(" UNIQUE");
        }
        def.push_str(&default_clause(column));
        def
    }
}

impl Grammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn map_type(&self, column: &Column) -> String {
        match &column.column_type {
            column_type if is_decimal_name(column_type) => "REAL".to_string(),
            ColumnType::Uuid | ColumnType::String | ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer | ColumnType::BigInteger | ColumnType::Boolean => {
                "INTEGER".to_string()
            }
            ColumnType::Timestamp | ColumnType::Date | ColumnType::Json => "TEXT".to_string(),
            ColumnType::Custom(name) => name.clone(),
            ColumnType::Decimal { .. } => "REAL".to_string(),
        }
    }

    fn compile_create_table(&self, blueprint: &Blueprint) -> String {
        let mut definitions: Vec<String> = blueprint
            .columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();

        for fk in blueprint.foreign_keys() {
            definitions.push(format!(
                "  FOREIGN KEY ({}) REFERENCES {}({}){}",
                fk.column,
                fk.references_table,
                fk.references_column,
                foreign_key_actions(fk)
            ));
        }

        create_table_statement(blueprint.table(), &definitions, ");")
    }

    fn compile_add_columns(&self, blueprint: &Blueprint) -> Vec<String> {
        blueprint
            .columns()
            .iter()
            .map(|column| {
                let mut sql = format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    blueprint.table(),
                    self.wrap_column(&column.name),
                    self.map_type(column)
                );
                if !column.nullable {
                    sql.push_str(" NOT NULL");
                }
                sql.push_str(&default_clause(column));
                sql
            })
            .collect()
    }

    fn compile_ledger_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \
                id INTEGER PRIMARY KEY,\n  \
                migration VARCHAR(255) NOT NULL UNIQUE,\n  \
                batch INTEGER NOT NULL,\n  \
                executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
            )",
            table
        )
    }

    fn compile_list_tables(&self) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_table() {
        let mut table = Blueprint::new("users");
        table.integer("id").primary().auto_increment();
        table.string("email").unique();
        table.boolean("verified").default(0);
        table.timestamps();
        table
            .foreign("business_id")
            .references("id")
            .on("businesses")
            .on_delete("cascade");

        assert_eq!(
            SqliteGrammar.compile_create_table(&table),
            "CREATE TABLE IF NOT EXISTS users (\n\
             \x20 id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n\
             \x20 email TEXT NOT NULL UNIQUE,\n\
             \x20 verified INTEGER NOT NULL DEFAULT 0,\n\
             \x20 created_at TEXT,\n\
             \x20 updated_at TEXT,\n\
             \x20 FOREIGN KEY (business_id) REFERENCES businesses(id) ON DELETE CASCADE\n\
             );"
        );
    }

    #[test]
    fn test_primary_without_auto_increment() {
        let mut table = Blueprint::new("users");
        table.uuid("id").primary();
        table.string("name");

        assert_eq!(
            SqliteGrammar.compile_create_table(&table),
            "CREATE TABLE IF NOT EXISTS users (\n  id TEXT PRIMARY KEY NOT NULL,\n  name TEXT NOT NULL\n);"
        );
    }

    #[test]
    fn test_add_columns_ignore_after() {
        let mut table = Blueprint::new("users");
        table.integer("age").after("name").nullable();
        table.string("nickname").default("anon");

        assert_eq!(
            SqliteGrammar.compile_add_columns(&table),
            vec![
                "ALTER TABLE users ADD COLUMN age INTEGER",
                "ALTER TABLE users ADD COLUMN nickname TEXT NOT NULL DEFAULT 'anon'",
            ]
        );
    }

    #[test]
    fn test_ledger_table_uses_rowid_primary_key() {
        let sql = SqliteGrammar.compile_ledger_table("schemata_migrations");
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS schemata_migrations (\n  \
             id INTEGER PRIMARY KEY,\n  \
             migration VARCHAR(255) NOT NULL UNIQUE,\n  \
             batch INTEGER NOT NULL,\n  \
             executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n)"
        );
    }
}
