//! Error types for schemata.

use thiserror::Error;

/// The main error type for schema and migration operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to parse a column type name.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// The database could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A rendered statement was rejected by the database.
    #[error("Execution error: {message}\n  statement: {statement}")]
    Execution { statement: String, message: String },

    /// A migration's forward action failed.
    #[error("migration {name} failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// A migration's backward action failed.
    #[error("rollback {name} failed: {source}")]
    Rollback {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// A ledger or housekeeping step failed.
    #[error("{operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// A ledger entry names a migration the caller did not supply.
    #[error("Migration not found for ledger entry: {0}")]
    UnresolvedRollbackTarget(String),

    /// Two migrations in one registry share a name.
    #[error("Duplicate migration name: '{0}'")]
    DuplicateMigration(String),

    /// A query returned a value of an unexpected shape.
    #[error("Unexpected value in column '{column}': {value}")]
    UnexpectedValue { column: String, value: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed configuration file.
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an execution error for the given statement.
    pub fn execution(statement: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure with the operation that was attempted.
    pub fn context(operation: impl Into<String>, source: SchemaError) -> Self {
        Self::Context {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a forward-action failure with the migration name.
    pub fn migration(name: impl Into<String>, source: SchemaError) -> Self {
        Self::Migration {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a backward-action failure with the migration name.
    pub fn rollback(name: impl Into<String>, source: SchemaError) -> Self {
        Self::Rollback {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for schemata operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
