//! Ledger domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockbook_shared::types::AccountId;

/// Account classification.
///
/// The type decides which side of the book increases the account: asset and
/// expense accounts are debit-normal, the rest are credit-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, inventory, receivables).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Earnings from operations (sales revenue).
    Income,
    /// Costs of operations (COGS, overheads).
    Expense,
}

impl AccountType {
    /// Returns true when debits increase this account's balance.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses the lowercase storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

/// Accounts the engine posts against by well-known code.
///
/// These must exist in the chart before documents can be realized; the seeder
/// plants them. Resolution failures surface as posting warnings, never as
/// silent data loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellKnownAccount {
    /// Cash on hand (1000).
    Cash,
    /// Bank account (1100).
    Bank,
    /// Accounts receivable (1200).
    AccountsReceivable,
    /// Inventory asset (1300).
    Inventory,
    /// Accounts payable (2000).
    AccountsPayable,
    /// Sales revenue (4000).
    SalesRevenue,
    /// Sales returns, contra-revenue (4100).
    SalesReturns,
    /// Cost of goods sold (5000).
    CostOfGoodsSold,
}

impl WellKnownAccount {
    /// All well-known accounts, in chart order.
    pub const ALL: [Self; 8] = [
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::AccountsPayable,
        Self::SalesRevenue,
        Self::SalesReturns,
        Self::CostOfGoodsSold,
    ];

    /// Returns the account code used in the chart.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cash => "1000",
            Self::Bank => "1100",
            Self::AccountsReceivable => "1200",
            Self::Inventory => "1300",
            Self::AccountsPayable => "2000",
            Self::SalesRevenue => "4000",
            Self::SalesReturns => "4100",
            Self::CostOfGoodsSold => "5000",
        }
    }

    /// Returns the default display name.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::AccountsReceivable => "Accounts Receivable",
            Self::Inventory => "Inventory",
            Self::AccountsPayable => "Accounts Payable",
            Self::SalesRevenue => "Sales Revenue",
            Self::SalesReturns => "Sales Returns",
            Self::CostOfGoodsSold => "Cost of Goods Sold",
        }
    }

    /// Returns the account type this code belongs to.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash | Self::Bank | Self::AccountsReceivable | Self::Inventory => {
                AccountType::Asset
            }
            Self::AccountsPayable => AccountType::Liability,
            // Sales returns is contra-revenue: income-typed, debit-heavy.
            Self::SalesRevenue | Self::SalesReturns => AccountType::Income,
            Self::CostOfGoodsSold => AccountType::Expense,
        }
    }
}

/// Which money-side account a cash movement touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash (account 1000).
    Cash,
    /// Bank transfer (account 1100).
    Bank,
}

impl PaymentMethod {
    /// Returns the well-known account this method settles through.
    #[must_use]
    pub const fn money_account(self) -> WellKnownAccount {
        match self {
            Self::Cash => WellKnownAccount::Cash,
            Self::Bank => WellKnownAccount::Bank,
        }
    }

    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
        }
    }

    /// Parses the lowercase storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }
}

/// Side of a double entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry (increases assets/expenses, decreases the rest).
    Debit,
    /// Credit entry (decreases assets/expenses, increases the rest).
    Credit,
}

impl EntrySide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// What produced a posting group; stored with every entry so the group can be
/// found, reversed, or audited as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Document realization (sale, purchase, return approval).
    Document,
    /// Refund settlement on a sale return.
    Refund,
    /// Payment realization.
    Payment,
    /// Reversing post correcting an earlier group.
    Reversal,
    /// Hand-written journal entry.
    Manual,
}

impl SourceType {
    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Refund => "refund",
            Self::Payment => "payment",
            Self::Reversal => "reversal",
            Self::Manual => "manual",
        }
    }

    /// Parses the lowercase storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "refund" => Some(Self::Refund),
            "payment" => Some(Self::Payment),
            "reversal" => Some(Self::Reversal),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// A single line of a posting group before it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// Account the line posts to.
    pub account: AccountId,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl EntryInput {
    /// Builds a debit line.
    #[must_use]
    pub fn debit(account: AccountId, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account,
            side: EntrySide::Debit,
            amount,
            description: Some(description.into()),
        }
    }

    /// Builds a credit line.
    #[must_use]
    pub fn credit(account: AccountId, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            account,
            side: EntrySide::Credit,
            amount,
            description: Some(description.into()),
        }
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.side {
            EntrySide::Debit => self.amount,
            EntrySide::Credit => -self.amount,
        }
    }
}

/// A balanced debit/credit pair planned by realization.
///
/// Pairs are balanced by construction, so a plan built purely from pairs can
/// never trip the unbalanced guard; the guard still runs before insert as the
/// last line of defense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPair {
    /// Account debited.
    pub debit: AccountId,
    /// Account credited.
    pub credit: AccountId,
    /// Positive amount posted on both sides.
    pub amount: Decimal,
    /// Description stamped on both lines.
    pub description: String,
}

impl PostingPair {
    /// Expands the pair into its two entry lines.
    #[must_use]
    pub fn into_lines(self) -> [EntryInput; 2] {
        [
            EntryInput::debit(self.debit, self.amount, self.description.clone()),
            EntryInput::credit(self.credit, self.amount, self.description),
        ]
    }
}

/// Totals of a validated posting group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingTotals {
    /// Sum of debit lines.
    pub debits: Decimal,
    /// Sum of credit lines.
    pub credits: Decimal,
}

impl PostingTotals {
    /// Returns true when debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debits == self.credits
    }
}
