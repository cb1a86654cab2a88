//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for accounts, ledger entries, products,
//!   warehouses, stock lots, documents, lines, and payments
//! - Repository abstractions that keep cross-row invariants transactional
//! - Database migrations
//! - A background threshold watcher emitting stock alerts

pub mod entities;
pub mod events;
pub mod migration;
pub mod repositories;

pub use events::{EventSender, StockEvent, ThresholdWatcher};
pub use repositories::{
    AccountRepository, DocumentRepository, LedgerRepository, PaymentRepository, ProductRepository,
    ReturnRepository, StockRepository, WarehouseRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
