//! Document domain types.
//!
//! A document is the single transactional record of the engine: sales,
//! purchases and their return counterparts all share one lifecycle and one
//! totals model. Kinds differ only in the direction of their stock and
//! ledger effects.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use stockbook_shared::types::ProductId;

/// Business meaning of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Outbound sale to a customer.
    Sale,
    /// Inbound purchase from a supplier.
    Purchase,
    /// Customer returns goods from a sale.
    SaleReturn,
    /// Goods sent back to a supplier.
    PurchaseReturn,
}

impl DocumentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::SaleReturn => "sale_return",
            Self::PurchaseReturn => "purchase_return",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sale" => Some(Self::Sale),
            "purchase" => Some(Self::Purchase),
            "sale_return" => Some(Self::SaleReturn),
            "purchase_return" => Some(Self::PurchaseReturn),
            _ => None,
        }
    }

    /// Returns true for the two return kinds.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::SaleReturn | Self::PurchaseReturn)
    }

    /// Returns the return kind that reverses this document, or `None` when
    /// the document is itself a return.
    #[must_use]
    pub const fn return_kind(self) -> Option<Self> {
        match self {
            Self::Sale => Some(Self::SaleReturn),
            Self::Purchase => Some(Self::PurchaseReturn),
            Self::SaleReturn | Self::PurchaseReturn => None,
        }
    }

    /// Returns true when realizing this kind takes stock out of the
    /// warehouse.
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::Sale | Self::PurchaseReturn)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document status in the processing lifecycle.
///
/// Documents progress through these states from creation to realization.
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Draft → Completed (process, when no approval is required)
/// - Pending → Approved (approve)
/// - Draft | Pending → Cancelled (cancel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Document is being drafted and can be modified.
    Draft,
    /// Document awaits approval.
    Pending,
    /// Document was processed directly; effects are applied.
    Completed,
    /// Document was approved; effects are applied.
    Approved,
    /// Document was cancelled before realization.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "approved" => Some(Self::Approved),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true once stock and ledger effects have been applied.
    #[must_use]
    pub const fn is_realized(self) -> bool {
        matches!(self, Self::Completed | Self::Approved)
    }

    /// Returns true while the document can still be modified or deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Returns true when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refund state of a sale return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    /// No refund has been paid out.
    None,
    /// The refund was paid out; a second payout is refused.
    Completed,
}

impl RefundStatus {
    /// Returns the string representation of the refund state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Completed => "completed",
        }
    }

    /// Parses a refund state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One line of a document as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Product being bought, sold or returned.
    pub product: ProductId,
    /// Quantity on the line. Must be positive.
    pub quantity: Decimal,
    /// Price per unit. Must not be negative.
    pub unit_price: Decimal,
    /// Batch label for batch-tracked stock.
    pub batch: Option<String>,
    /// Expiry date carried into the stock lot on inbound kinds.
    pub expiry_date: Option<NaiveDate>,
}

impl LineInput {
    /// Creates a plain line without batch or expiry tracking.
    #[must_use]
    pub fn new(product: ProductId, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product,
            quantity,
            unit_price,
            batch: None,
            expiry_date: None,
        }
    }

    /// Attaches a batch label to the line.
    #[must_use]
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Attaches an expiry date to the line.
    #[must_use]
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Quantity times unit price, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Discount applied to a document before the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// No discount.
    None,
    /// Fixed amount off, capped at the subtotal.
    Flat(Decimal),
    /// Percentage of the subtotal, capped at the subtotal.
    Percent(Decimal),
}

impl Default for Discount {
    fn default() -> Self {
        Self::None
    }
}

/// Monetary totals of a document, all rounded to two decimal places.
///
/// `total = subtotal + tax_amount - discount_amount`. Tax is charged on the
/// undiscounted subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Tax charged on the subtotal.
    pub tax_amount: Decimal,
    /// Discount taken off, never more than the subtotal.
    pub discount_amount: Decimal,
    /// Amount the counterparty owes or is owed.
    pub total: Decimal,
}
