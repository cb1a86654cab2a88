//! Stock domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockbook_shared::types::{ProductId, WarehouseId};

/// Identity of a stock lot: one product in one warehouse under one batch
/// label. The batch-less bucket is its own lot, distinct from every labeled
/// batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LotKey {
    /// Product tracked by the lot.
    pub product: ProductId,
    /// Warehouse holding the lot.
    pub warehouse: WarehouseId,
    /// Batch label, `None` for unbatched stock.
    pub batch: Option<String>,
}

impl LotKey {
    /// Creates a lot key.
    #[must_use]
    pub fn new(product: ProductId, warehouse: WarehouseId, batch: Option<String>) -> Self {
        Self {
            product,
            warehouse,
            batch,
        }
    }

    /// Creates a key for the batch-less bucket.
    #[must_use]
    pub fn batchless(product: ProductId, warehouse: WarehouseId) -> Self {
        Self {
            product,
            warehouse,
            batch: None,
        }
    }

    /// Returns the batch value as stored: the empty string stands in for the
    /// batch-less bucket so the storage unique index covers it.
    #[must_use]
    pub fn storage_batch(&self) -> &str {
        self.batch.as_deref().unwrap_or("")
    }

    /// Rebuilds a key from its stored columns.
    #[must_use]
    pub fn from_storage(product: ProductId, warehouse: WarehouseId, batch: &str) -> Self {
        Self {
            product,
            warehouse,
            batch: if batch.is_empty() {
                None
            } else {
                Some(batch.to_string())
            },
        }
    }
}

impl std::fmt::Display for LotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.batch {
            Some(batch) => write!(
                f,
                "product {} in warehouse {} (batch {batch})",
                self.product, self.warehouse
            ),
            None => write!(
                f,
                "product {} in warehouse {} (no batch)",
                self.product, self.warehouse
            ),
        }
    }
}

/// Why a movement happened; recorded on events and audit rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received from a purchase.
    Receipt,
    /// Goods issued for a sale.
    Issue,
    /// Inbound side of a warehouse transfer.
    TransferIn,
    /// Outbound side of a warehouse transfer.
    TransferOut,
    /// Goods returned by a customer.
    ReturnIn,
    /// Goods sent back to a supplier.
    ReturnOut,
    /// Manual absolute correction.
    Adjustment,
}

impl MovementKind {
    /// Returns the lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Issue => "issue",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::ReturnIn => "return_in",
            Self::ReturnOut => "return_out",
            Self::Adjustment => "adjustment",
        }
    }
}

/// A signed quantity change against one lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    /// Lot the movement applies to.
    pub key: LotKey,
    /// Signed quantity change; positive receives, negative issues.
    pub delta: Decimal,
    /// Movement classification.
    pub kind: MovementKind,
    /// Unit cost for lots created by this movement.
    pub unit_cost: Option<Decimal>,
    /// Expiry date for lots created by this movement.
    pub expiry_date: Option<NaiveDate>,
}

impl Movement {
    /// Builds an inbound movement of `quantity` (> 0 expected).
    #[must_use]
    pub fn inbound(
        key: LotKey,
        quantity: Decimal,
        kind: MovementKind,
        unit_cost: Option<Decimal>,
        expiry_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            key,
            delta: quantity,
            kind,
            unit_cost,
            expiry_date,
        }
    }

    /// Builds an outbound movement of `quantity` (> 0 expected).
    #[must_use]
    pub fn outbound(key: LotKey, quantity: Decimal, kind: MovementKind) -> Self {
        Self {
            key,
            delta: -quantity,
            kind,
            unit_cost: None,
            expiry_date: None,
        }
    }

    /// Returns the absolute quantity moved.
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.delta.abs()
    }
}

/// One row of the low-stock snapshot: on-hand summed across batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockRow {
    /// Product running low.
    pub product: ProductId,
    /// Warehouse it is low in.
    pub warehouse: WarehouseId,
    /// Total on hand across all batches.
    pub on_hand: Decimal,
}

/// One row of the expired-lot snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredLotRow {
    /// Product in the expired lot.
    pub product: ProductId,
    /// Warehouse holding the lot.
    pub warehouse: WarehouseId,
    /// Batch label, `None` for unbatched stock.
    pub batch: Option<String>,
    /// The lot's expiry date.
    pub expiry_date: NaiveDate,
    /// Quantity still on hand.
    pub on_hand: Decimal,
}
