//! `SeaORM` entity definitions.
//!
//! Enumerated columns (document kind, status, movement kind, and the like)
//! are stored as lowercase strings rather than database enums so the schema
//! works unchanged on `PostgreSQL` and `SQLite`. The core crate owns the
//! parse functions.

pub mod accounts;
pub mod document_lines;
pub mod documents;
pub mod ledger_entries;
pub mod payments;
pub mod products;
pub mod stock_adjustments;
pub mod stock_lots;
pub mod warehouses;
