//! Ledger error types for validation and posting failures.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while validating or planning postings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A posting group must have at least 2 entries.
    #[error("Posting must contain at least 2 entries")]
    InsufficientEntries,

    /// A posting group must touch both sides of the book.
    #[error("Posting must contain both debit and credit entries")]
    SingleSided,

    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// The group does not balance (sum of debits != sum of credits).
    #[error("Posting is not balanced. Debits: {debits}, Credits: {credits}")]
    Unbalanced {
        /// Total of debit lines.
        debits: Decimal,
        /// Total of credit lines.
        credits: Decimal,
    },

    // ========== Reversal Errors ==========
    /// Nothing to reverse.
    #[error("No entries found to reverse")]
    NothingToReverse,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::SingleSided => "SINGLE_SIDED_POSTING",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_LEDGER",
            Self::NothingToReverse => "NOTHING_TO_REVERSE",
        }
    }
}
