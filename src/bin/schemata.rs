//! schemata: inspect and maintain the migrations table.
//!
//! This binary carries no migrations of its own, so `init`, `status` and
//! `ledger` are the useful commands here. Applications embed
//! [`schemata::cli::run`] with their own registry to migrate.
//!
//! ```bash
//! schemata init --database-url postgres://localhost/app
//! DB_DRIVER=sqlite DB_DSN=./app.db schemata ledger
//! ```

use colored::*;
use schemata::Registry;

fn main() {
    if let Err(e) = schemata::cli::run(&Registry::new()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
