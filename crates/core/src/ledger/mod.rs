//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account types and the well-known chart codes
//! - Posting inputs and balanced pairs
//! - Balance calculations (always derived, never stored)
//! - Business rule validation for posting groups
//! - Reversing entry planning for corrections

pub mod balance;
pub mod error;
pub mod reversal;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod validation_props;

pub use balance::AccountBalance;
pub use error::LedgerError;
pub use reversal::{ReversalPlan, ReversalService};
pub use types::{
    AccountType, EntryInput, EntrySide, PaymentMethod, PostingPair, PostingTotals, SourceType,
    WellKnownAccount,
};
pub use validation::validate_posting;
