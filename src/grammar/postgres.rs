use super::{
    Dialect, Grammar, create_table_statement, custom_type, default_clause, foreign_key_actions,
};
use crate::blueprint::{Blueprint, Column, ColumnType};

/// PostgreSQL grammar.
pub struct PostgresGrammar;

impl PostgresGrammar {
    fn column_definition(&self, column: &Column) -> String {
        let mut def = format!("  {} {}", self.wrap_column(&column.name), self.map_type(column));

        if column.primary {
            def.push_str(" PRIMARY KEY");
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

impl Grammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn map_type(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::String => "VARCHAR(255)".to_string(),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer if column.auto_increment => "SERIAL".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger if column.auto_increment => "BIGSERIAL".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Json => "JSONB".to_string(),
            ColumnType::Custom(name) => custom_type(name),
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
                "  CONSTRAINT fk_{}_{} FOREIGN KEY ({}) REFERENCES {}({}){}",
                blueprint.table(),
                fk.column,
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
                id SERIAL PRIMARY KEY,\n  \
                migration VARCHAR(255) NOT NULL UNIQUE,\n  \
                batch INTEGER NOT NULL,\n  \
                executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
            )",
            table
        )
    }

    fn compile_list_tables(&self) -> String {
        "SELECT CAST(tablename AS TEXT) AS name FROM pg_tables WHERE schemaname = 'public'"
            .to_string()
    }
}
