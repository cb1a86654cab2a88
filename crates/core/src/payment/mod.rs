//! Payment logic.
//!
//! Payments are single-pair postings outside the document flow: receipts,
//! supplier settlements, expenses and cash/bank transfers.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::PaymentKind;
