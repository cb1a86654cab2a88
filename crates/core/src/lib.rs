//! Core business logic for Stockbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the db crate
//! supplies persistence and transaction boundaries around them.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: accounts, posting validation, balances, reversals
//! - `stock` - Per-lot quantity tracking, movement validation, snapshots
//! - `document` - Business document lifecycle, totals, and realization planning
//! - `payment` - Treasury documents (receipts, payments, expenses, bank moves)
//! - `alerts` - Low-stock and expiry alert evaluation

pub mod alerts;
pub mod document;
pub mod ledger;
pub mod payment;
pub mod stock;
