use super::{
    Dialect, Grammar, create_table_statement, custom_type, default_clause, foreign_key_actions,
};
use crate::blueprint::{Blueprint, Column, ColumnType};

/// Column names that MySQL only accepts back-quoted.
pub const RESERVED_WORDS: &[&str] = &[
    "limit",
    "order",
    "group",
    "key",
    "index",
    "type",
    "desc",
    "asc",
    "primary",
    "foreign",
    "references",
    "constraint",
    "table",
    "column",
    "select",
    "from",
    "where",
    "join",
    "on",
    "and",
    "or",
    "not",
    "like",
    "in",
    "between",
    "is",
    "null",
    "default",
    "unique",
    "check",
    "cascade",
    "restrict",
    "set",
];

/// MySQL grammar.
pub struct MySqlGrammar;

impl MySqlGrammar {
    fn column_definition(&self, column: &Column) -> String {
        let mut def = format!("  {} {}", self.wrap_column(&column.name), self.map_type(column));

        if column.auto_increment {
            def.push_str(" AUTO_INCREMENT");
        }
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

impl Grammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn map_type(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::Uuid => "CHAR(36)".to_string(),
            ColumnType::String => "VARCHAR(255)".to_string(),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Custom(name) => custom_type(name),
        }
    }

    fn wrap_column(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        if RESERVED_WORDS.contains(&lower.as_str()) {
            format!("`{}`", name)
        } else {
            name.to_string()
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

        create_table_statement(
            blueprint.table(),
            &definitions,
            ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;",
        )
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
                if let Some(after) = &column.after {
                    sql.push_str(&format!(" AFTER {}", after));
                }
                sql
            })
            .collect()
    }

    // MySQL has no `DROP INDEX IF EXISTS`.
    fn compile_drop_index(&self, index: &str) -> String {
        format!("DROP INDEX {}", index)
    }

    fn compile_ledger_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \
                id INT AUTO_INCREMENT PRIMARY KEY,\n  \
                migration VARCHAR(255) NOT NULL UNIQUE,\n  \
                batch INT NOT NULL,\n  \
                executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            table
        )
    }

    fn compile_list_tables(&self) -> String {
        "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = DATABASE()"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_table() {
        let mut table = Blueprint::new("orders");
        table.integer("id").primary().auto_increment();
        table.string("order").unique();
        table.decimal("total", 10, 2).default("0.00");
        table.json("meta").nullable();
        table
            .foreign("user_id")
            .references("id")
            .on("users")
            .on_delete("cascade")
            .on_update("restrict");

        assert_eq!(
            MySqlGrammar.compile_create_table(&table),
            "CREATE TABLE IF NOT EXISTS orders (\n\
             \x20 id INT AUTO_INCREMENT PRIMARY KEY NOT NULL,\n\
             \x20 `order` VARCHAR(255) NOT NULL UNIQUE,\n\
             \x20 total DECIMAL(10,2) NOT NULL DEFAULT '0.00',\n\
             \x20 meta JSON,\n\
             \x20 CONSTRAINT fk_orders_user_id FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE ON UPDATE RESTRICT\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;"
        );
    }

    #[test]
    fn test_add_columns_honor_after() {
        let mut table = Blueprint::new("users");
        table.integer("age").after("name").nullable();
        table.boolean("active").default(true);
        table.string("Key");

        assert_eq!(
            MySqlGrammar.compile_add_columns(&table),
            vec![
                "ALTER TABLE users ADD COLUMN age INT AFTER name",
                "ALTER TABLE users ADD COLUMN active TINYINT(1) NOT NULL DEFAULT true",
                "ALTER TABLE users ADD COLUMN `Key` VARCHAR(255) NOT NULL",
            ]
        );
    }

    #[test]
    fn test_reserved_words_are_quoted_case_insensitively() {
        assert_eq!(MySqlGrammar.wrap_column("type"), "`type`");
        assert_eq!(MySqlGrammar.wrap_column("Desc"), "`Desc`");
        assert_eq!(MySqlGrammar.wrap_column("name"), "name");
    }

    #[test]
    fn test_ledger_table_uses_innodb() {
        let sql = MySqlGrammar.compile_ledger_table("schemata_migrations");
        assert!(sql.contains("id INT AUTO_INCREMENT PRIMARY KEY"));
        assert!(sql.contains("migration VARCHAR(255) NOT NULL UNIQUE"));
        assert!(sql.contains("batch INT NOT NULL"));
        assert!(sql.ends_with(") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
    }
}
