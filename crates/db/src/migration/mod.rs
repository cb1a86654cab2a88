//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. The schema is written
//! with the portable DSL so the same migrations run on `PostgreSQL` and
//! `SQLite`.

pub use sea_orm_migration::prelude::*;

mod m20260715_000001_initial;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260715_000001_initial::Migration)]
    }
}
