//! A small application binary that embeds the schemata command runner.
//!
//! ```bash
//! cargo run --example basic -- migrate --database-url "sqlite://./test.db?mode=rwc"
//! cargo run --example basic -- status --database-url "sqlite://./test.db?mode=rwc"
//! cargo run --example basic -- rollback --database-url "sqlite://./test.db?mode=rwc"
//! ```

use schemata::prelude::*;

fn registry() -> SchemaResult<Registry> {
    let mut registry = Registry::new();

    registry.add(
        "2024_01_01_000001_create_businesses_table",
        |schema: &Schema| {
            schema.create("businesses", |table| {
                table.uuid("id").primary();
                table.string("name");
                table.timestamps();
            })
        },
        |schema: &Schema| schema.drop("businesses"),
    )?;

    registry.add(
        "2024_01_01_000002_create_users_table",
        |schema: &Schema| {
            schema.create("users", |table| {
                table.uuid("id").primary();
                table.uuid("business_id");
                table.string("name").nullable();
                table.boolean("verified").default(false);
                table.timestamps();
                table
                    .foreign("business_id")
                    .references("id")
                    .on("businesses")
                    .on_delete("cascade");
            })
        },
        |schema: &Schema| schema.drop("users"),
    )?;

    registry.add(
        "2024_01_02_000001_add_age_to_users",
        |schema: &Schema| {
            schema.modify("users", |table| {
                table.integer("age").after("name").nullable();
            })
        },
        |schema: &Schema| schema.drop_column("users", "age"),
    )?;

    Ok(registry)
}

fn main() -> anyhow::Result<()> {
    let registry = registry()?;
    schemata::cli::run(&registry)
}
