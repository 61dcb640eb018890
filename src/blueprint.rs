//! Table blueprints.
//!
//! A [`Blueprint`] is the in-memory description of one table: its ordered
//! columns and its foreign keys. It is handed to the caller's definition
//! closure by [`Schema::create`](crate::schema::Schema::create) and
//! [`Schema::modify`](crate::schema::Schema::modify), compiled by a
//! [`Grammar`](crate::grammar::Grammar), and dropped once the DDL has run.
//!
//! ```
//! use schemata::blueprint::Blueprint;
//!
//! let mut table = Blueprint::new("users");
//! table.uuid("id").primary();
//! table.string("email").unique();
//! table.boolean("verified").default(false);
//! table.foreign("business_id").references("id").on("businesses").on_delete("cascade");
//! table.timestamps();
//!
//! assert_eq!(table.columns().len(), 5);
//! ```

use std::fmt;

use crate::parser;

/// Semantic column types understood by every dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    String,
    Text,
    Integer,
    BigInteger,
    Boolean,
    Decimal { precision: u32, scale: u32 },
    Timestamp,
    Date,
    Json,
    /// A type name no dialect knows about; rendered as written.
    Custom(String),
}

impl ColumnType {
    /// Defaults for these types are rendered without quotes.
    pub fn has_unquoted_default(&self) -> bool {
        matches!(
            self,
            ColumnType::Boolean | ColumnType::Integer | ColumnType::BigInteger
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Uuid => write!(f, "uuid"),
            ColumnType::String => write!(f, "string"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::BigInteger => write!(f, "bigint"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Decimal { precision, scale } => {
                write!(f, "decimal({},{})", precision, scale)
            }
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Json => write!(f, "json"),
            ColumnType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary: bool,
    pub unique: bool,
    /// Default literal, stored exactly as the caller formatted it.
    pub default: Option<String>,
    /// Positional placement hint. Only MySQL's ADD COLUMN honors it.
    pub after: Option<String>,
    pub auto_increment: bool,
}

impl Column {
    /// A non-nullable column with no modifiers.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary: false,
            unique: false,
            default: None,
            after: None,
            auto_increment: false,
        }
    }
}

/// A single-column foreign key constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    /// Free-form action; uppercased when rendered, omitted when empty.
    pub on_delete: String,
    pub on_update: String,
}

/// In-memory definition of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    table: String,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKey>,
}

impl Blueprint {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Append a fully-formed column.
    pub fn add_column(&mut self, column: Column) -> ColumnBuilder<'_> {
        let index = self.columns.len();
        self.columns.push(column);
        ColumnBuilder {
            column: &mut self.columns[index],
        }
    }

    /// Declare a column from a textual type name such as `"decimal(10,2)"`.
    ///
    /// Names that are not one of the semantic types are kept verbatim and
    /// passed through to the DDL.
    pub fn column(&mut self, name: &str, type_name: &str) -> ColumnBuilder<'_> {
        let column_type = parser::column_type_or_custom(type_name);
        self.add_column(Column::new(name, column_type))
    }

    pub fn uuid(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Uuid))
    }

    pub fn string(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::String))
    }

    pub fn text(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Text))
    }

    pub fn integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Integer))
    }

    pub fn big_integer(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::BigInteger))
    }

    pub fn boolean(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Boolean))
    }

    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Decimal { precision, scale }))
    }

    pub fn timestamp(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Timestamp))
    }

    pub fn date(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Date))
    }

    pub fn json(&mut self, name: &str) -> ColumnBuilder<'_> {
        self.add_column(Column::new(name, ColumnType::Json))
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) {
        self.timestamp("deleted_at").nullable();
    }

    /// Start a foreign key on `column`.
    pub fn foreign(&mut self, column: &str) -> ForeignKeyBuilder<'_> {
        let index = self.foreign_keys.len();
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            ..ForeignKey::default()
        });
        ForeignKeyBuilder {
            foreign_key: &mut self.foreign_keys[index],
        }
    }
}

/// Chainable modifiers for the column that was just declared.
#[derive(Debug)]
pub struct ColumnBuilder<'a> {
    column: &'a mut Column,
}

impl ColumnBuilder<'_> {
    pub fn nullable(self) -> Self {
        self.column.nullable = true;
        self
    }

    pub fn primary(self) -> Self {
        self.column.primary = true;
        self
    }

    pub fn unique(self) -> Self {
        self.column.unique = true;
        self
    }

    /// Set the default literal. The value is formatted with `Display`.
    pub fn default(self, value: impl fmt::Display) -> Self {
        self.column.default = Some(value.to_string());
        self
    }

    pub fn after(self, column: &str) -> Self {
        self.column.after = Some(column.to_string());
        self
    }

    pub fn auto_increment(self) -> Self {
        self.column.auto_increment = true;
        self
    }
}

/// Chainable setters for a foreign key declared with [`Blueprint::foreign`].
#[derive(Debug)]
pub struct ForeignKeyBuilder<'a> {
    foreign_key: &'a mut ForeignKey,
}

impl ForeignKeyBuilder<'_> {
    /// The referenced column.
    pub fn references(self, column: &str) -> Self {
        self.foreign_key.references_column = column.to_string();
        self
    }

    /// The referenced table.
    pub fn on(self, table: &str) -> Self {
        self.foreign_key.references_table = table.to_string();
        self
    }

    pub fn on_delete(self, action: &str) -> Self {
        self.foreign_key.on_delete = action.to_string();
        self
    }

    pub fn on_update(self, action: &str) -> Self {
        self.foreign_key.on_update = action.to_string();
        self
    }
}
