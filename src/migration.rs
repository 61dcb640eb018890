//! Named migrations and the registry that holds them.

use std::collections::HashMap;
use std::fmt;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;

type Action = Box<dyn Fn(&Schema) -> SchemaResult<()> + Send + Sync>;

/// A named, reversible schema change.
pub struct Migration {
    name: String,
    up: Action,
    down: Action,
}

impl Migration {
    pub fn new<U, D>(name: impl Into<String>, up: U, down: D) -> Self
    where
        U: Fn(&Schema) -> SchemaResult<()> + Send + Sync + 'static,
        D: Fn(&Schema) -> SchemaResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            up: Box::new(up),
            down: Box::new(down),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the forward action.
    pub fn up(&self, schema: &Schema) -> SchemaResult<()> {
        (self.up)(schema)
    }

    /// Run the backward action.
    pub fn down(&self, schema: &Schema) -> SchemaResult<()> {
        (self.down)(schema)
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The migrations known to one run, in registration order.
///
/// Names are unique; the migrator orders pending migrations by name, so
/// registration order does not matter.
#[derive(Debug, Default)]
pub struct Registry {
    migrations: Vec<Migration>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate names.
    pub fn from_migrations(migrations: impl IntoIterator<Item = Migration>) -> SchemaResult<Self> {
        let mut registry = Self::new();
        for migration in migrations {
            registry.register(migration)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, migration: Migration) -> SchemaResult<&mut Self> {
        if self.index.contains_key(migration.name()) {
            return Err(SchemaError::DuplicateMigration(migration.name().to_string()));
        }
        self.index
            .insert(migration.name().to_string(), self.migrations.len());
        self.migrations.push(migration);
        Ok(self)
    }

    /// Register a migration from its name and two actions.
    pub fn add<U, D>(&mut self, name: &str, up: U, down: D) -> SchemaResult<&mut Self>
    where
        U: Fn(&Schema) -> SchemaResult<()> + Send + Sync + 'static,
        D: Fn(&Schema) -> SchemaResult<()> + Send + Sync + 'static,
    {
        self.register(Migration::new(name, up, down))
    }

    pub fn get(&self, name: &str) -> Option<&Migration> {
        self.index.get(name).map(|&i| &self.migrations[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Names sorted ascending.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.migrations.iter().map(Migration::name).collect();
        names.sort_unstable();
        names
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop(_: &Schema) -> SchemaResult<()> {
        Ok(())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry
            .add("create_users_table", noop, noop)
            .unwrap()
            .add("create_businesses_table", noop, noop)
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("create_users_table").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.names(),
            vec!["create_businesses_table", "create_users_table"]
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = Registry::from_migrations([
            Migration::new("create_users_table", noop, noop),
            Migration::new("create_users_table", noop, noop),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            SchemaError::DuplicateMigration(name) if name == "create_users_table"
        ));
    }

    #[test]
    fn test_iteration_keeps_registration_order() {
        let registry = Registry::from_migrations([
            Migration::new("b", noop, noop),
            Migration::new("a", noop, noop),
        ])
        .unwrap();

        let names: Vec<&str> = registry.iter().map(Migration::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(!registry.is_empty());
        assert_eq!(format!("{:?}", registry.migrations[0]), "Migration { name: \"b\", .. }");
    }
}
