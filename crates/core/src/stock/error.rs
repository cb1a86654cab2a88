//! Stock error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::LotKey;

/// Errors that can occur while validating stock movements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Not enough on hand to satisfy an outbound movement. Nothing is
    /// applied; partial draws never happen.
    #[error("Insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Lot that came up short.
        key: LotKey,
        /// Quantity the movement asked for.
        requested: Decimal,
        /// Quantity actually on hand.
        available: Decimal,
    },

    /// Movements must change the quantity.
    #[error("Movement quantity cannot be zero")]
    ZeroMovement,

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative")]
    NegativeUnitCost,

    /// Adjustments set an absolute quantity, which cannot be negative.
    #[error("Adjustment quantity cannot be negative: {requested}")]
    NegativeAdjustment {
        /// The rejected target quantity.
        requested: Decimal,
    },
}

impl StockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ZeroMovement => "ZERO_MOVEMENT",
            Self::NegativeUnitCost => "NEGATIVE_UNIT_COST",
            Self::NegativeAdjustment { .. } => "NEGATIVE_ADJUSTMENT",
        }
    }
}
