//! Progress events emitted by the migrator.

use std::fmt;

use colored::*;

/// One step of a migrate, rollback, reset or fresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    Migrating(&'a str),
    Migrated(&'a str),
    RollingBack(&'a str),
    RolledBack(&'a str),
    /// A table dropped by `fresh`.
    DroppedTable(&'a str),
    /// Undoing a migration of a batch that failed part way.
    Compensating(&'a str),
    NothingToMigrate,
    NothingToRollback,
    NothingToReset,
}

impl Progress<'_> {
    /// Verb column of the rendered line, without the name.
    fn label(&self) -> &'static str {
        match self {
            Progress::Migrating(_) => "Migrating:",
            Progress::Migrated(_) => "Migrated: ",
            Progress::RollingBack(_) => "Rolling back:",
            Progress::RolledBack(_) => "Rolled back:",
            Progress::DroppedTable(_) => "Dropped table:",
            Progress::Compensating(_) => "Compensating:",
            Progress::NothingToMigrate => "Nothing to migrate",
            Progress::NothingToRollback => "Nothing to rollback",
            Progress::NothingToReset => "Nothing to reset",
        }
    }

    fn subject(&self) -> Option<&str> {
        match *self {
            Progress::Migrating(name)
            | Progress::Migrated(name)
            | Progress::RollingBack(name)
            | Progress::RolledBack(name)
            | Progress::DroppedTable(name)
            | Progress::Compensating(name) => Some(name),
            Progress::NothingToMigrate | Progress::NothingToRollback | Progress::NothingToReset => {
                None
            }
        }
    }
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject() {
            Some(name) => write!(f, "{} {}", self.label(), name),
            None => f.write_str(self.label()),
        }
    }
}

/// Receives progress events.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Progress<'_>);
}

impl<F> Observer for F
where
    F: Fn(&Progress<'_>) + Send + Sync,
{
    fn notify(&self, event: &Progress<'_>) {
        self(event)
    }
}

/// Logs each event at `info` level. The migrator's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &Progress<'_>) {
        tracing::info!("{}", event);
    }
}

/// Prints each event to stdout in color.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn notify(&self, event: &Progress<'_>) {
        let label = event.label();
        let label = match event {
            Progress::Migrating(_) | Progress::RollingBack(_) => label.yellow(),
            Progress::Migrated(_) | Progress::RolledBack(_) => label.green(),
            Progress::DroppedTable(_) => label.cyan(),
            Progress::Compensating(_) => label.red(),
            _ => label.dimmed(),
        };
        match event.subject() {
            Some(name) => println!("{} {}", label, name),
            None => println!("{}", label),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_progress_lines() {
        assert_eq!(
            Progress::Migrating("create_users_table").to_string(),
            "Migrating: create_users_table"
        );
        assert_eq!(
            Progress::Migrated("create_users_table").to_string(),
            "Migrated:  create_users_table"
        );
        assert_eq!(Progress::RollingBack("a").to_string(), "Rolling back: a");
        assert_eq!(Progress::RolledBack("a").to_string(), "Rolled back: a");
        assert_eq!(Progress::NothingToMigrate.to_string(), "Nothing to migrate");
        assert_eq!(Progress::NothingToRollback.to_string(), "Nothing to rollback");
        assert_eq!(Progress::NothingToReset.to_string(), "Nothing to reset");
    }

    #[test]
    fn test_closures_are_observers() {
        let lines = Mutex::new(Vec::new());
        let observer = |event: &Progress<'_>| lines.lock().unwrap().push(event.to_string());

        observer.notify(&Progress::Migrating("a"));
        observer.notify(&Progress::Migrated("a"));

        assert_eq!(*lines.lock().unwrap(), vec!["Migrating: a", "Migrated:  a"]);
    }
}
