//! Payment domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business meaning of a money movement outside the document flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Customer settles a receivable.
    CustomerReceipt,
    /// Supplier invoice is settled.
    SupplierPayment,
    /// Money spent on a cost account.
    Expense,
    /// Cash moved from the till into the bank.
    BankDeposit,
    /// Cash drawn from the bank into the till.
    BankWithdrawal,
}

impl PaymentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CustomerReceipt => "customer_receipt",
            Self::SupplierPayment => "supplier_payment",
            Self::Expense => "expense",
            Self::BankDeposit => "bank_deposit",
            Self::BankWithdrawal => "bank_withdrawal",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer_receipt" => Some(Self::CustomerReceipt),
            "supplier_payment" => Some(Self::SupplierPayment),
            "expense" => Some(Self::Expense),
            "bank_deposit" => Some(Self::BankDeposit),
            "bank_withdrawal" => Some(Self::BankWithdrawal),
            _ => None,
        }
    }

    /// Returns true when this kind settles a sale and counts towards its
    /// paid amount.
    #[must_use]
    pub const fn settles_receivable(self) -> bool {
        matches!(self, Self::CustomerReceipt)
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
