//! Stock alert evaluation.
//!
//! Alerts are computed from read-only snapshots; raising one never blocks
//! or mutates the flows that caused it.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stockbook_shared::types::{ProductId, WarehouseId};
use stockbook_shared::PolicyConfig;

use crate::stock::{ExpiredLotRow, LowStockRow};

/// A condition worth notifying someone about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockAlert {
    /// On-hand quantity at or below the configured threshold.
    LowStock {
        /// Product running low.
        product: ProductId,
        /// Warehouse it is low in.
        warehouse: WarehouseId,
        /// Total on hand across batches.
        on_hand: Decimal,
        /// Threshold that was hit.
        threshold: Decimal,
    },
    /// A batch past its expiry date with stock still on hand.
    ExpiredLot {
        /// Product of the expired lot.
        product: ProductId,
        /// Warehouse holding the lot.
        warehouse: WarehouseId,
        /// Batch label, `None` for unbatched stock.
        batch: Option<String>,
        /// Date the lot expired.
        expiry_date: NaiveDate,
        /// Quantity still on hand.
        on_hand: Decimal,
    },
}

impl fmt::Display for StockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowStock {
                product,
                warehouse,
                on_hand,
                threshold,
            } => write!(
                f,
                "Low stock: product {product} in warehouse {warehouse} has {on_hand} on hand (threshold {threshold})"
            ),
            Self::ExpiredLot {
                product,
                warehouse,
                batch,
                expiry_date,
                on_hand,
            } => write!(
                f,
                "Expired lot: product {product} batch {} in warehouse {warehouse} expired on {expiry_date} with {on_hand} on hand",
                batch.as_deref().unwrap_or("-")
            ),
        }
    }
}

/// Evaluates snapshots against the policy and returns the alerts to raise.
///
/// Low-stock rows alert at or below `policy.low_stock_threshold`. Expired
/// rows alert only while stock remains on hand; an empty expired lot is
/// history, not a problem.
#[must_use]
pub fn evaluate(
    lows: &[LowStockRow],
    expired: &[ExpiredLotRow],
    policy: &PolicyConfig,
) -> Vec<StockAlert> {
    let threshold = policy.low_stock_threshold;
    let mut alerts = Vec::new();

    for row in lows {
        if row.on_hand <= threshold {
            alerts.push(StockAlert::LowStock {
                product: row.product,
                warehouse: row.warehouse,
                on_hand: row.on_hand,
                threshold,
            });
        }
    }

    for row in expired {
        if row.on_hand > Decimal::ZERO {
            alerts.push(StockAlert::ExpiredLot {
                product: row.product,
                warehouse: row.warehouse,
                batch: row.batch.clone(),
                expiry_date: row.expiry_date,
                on_hand: row.on_hand,
            });
        }
    }

    alerts
}
