//! Payment domain errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::WellKnownAccount;

/// Errors raised while planning a payment posting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The amount must be positive.
    #[error("Payment amount must be positive, got {requested}")]
    NonPositiveAmount {
        /// Amount asked for.
        requested: Decimal,
    },

    /// Expense payments must name the cost account to debit.
    #[error("Expense payments require an expense account")]
    ExpenseAccountRequired,

    /// A well-known account needed by the posting is missing from the
    /// chart. Unlike document realization, a payment has no other effect,
    /// so it fails instead of degrading.
    #[error("Account {} ({}) is missing from the chart", account.code(), account.default_name())]
    MissingAccount {
        /// The account that could not be resolved.
        account: WellKnownAccount,
    },
}

impl PaymentError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } | Self::ExpenseAccountRequired => "VALIDATION_ERROR",
            Self::MissingAccount { .. } => "REFERENCE_INTEGRITY_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PaymentError::NonPositiveAmount {
                requested: dec!(-1)
            }
            .error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            PaymentError::MissingAccount {
                account: WellKnownAccount::Cash
            }
            .error_code(),
            "REFERENCE_INTEGRITY_ERROR"
        );
    }

    #[test]
    fn test_missing_account_names_the_code() {
        let err = PaymentError::MissingAccount {
            account: WellKnownAccount::Bank,
        };
        assert!(err.to_string().contains("1100"));
    }
}
