//! Stock ledger logic.
//!
//! Quantities are tracked per lot: one product in one warehouse under one
//! batch label (with a dedicated batch-less bucket). This module holds the
//! pure movement rules; the db layer makes them atomic.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::StockError;
pub use service::StockService;
pub use types::{ExpiredLotRow, LotKey, LowStockRow, Movement, MovementKind};
