//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Invariants that span rows, such as balanced ledger
//! groups or the stock-before-ledger ordering of document realization,
//! are enforced here inside a single transaction.

pub mod account;
pub mod catalog;
pub mod document;
pub mod ledger;
pub mod payment;
pub mod returns;
pub mod stock;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use catalog::{
    CatalogError, CreateProductInput, CreateWarehouseInput, ProductRepository, WarehouseRepository,
};
pub use document::{
    CreateDocumentInput, DocumentError, DocumentRepository, DocumentWithLines, UpdateDocumentInput,
};
pub use ledger::{LedgerRepository, PostingError, TrialBalanceRow};
pub use payment::{CreatePaymentInput, PaymentError, PaymentRepository};
pub use returns::{CreateReturnInput, ReturnLineInput, ReturnRepository};
pub use stock::{MovementError, StockRepository};

#[cfg(test)]
mod support;

#[cfg(test)]
mod stock_tests;
