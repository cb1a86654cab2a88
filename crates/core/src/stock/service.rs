//! Movement validation and quantity arithmetic.
//!
//! Pure functions only; the db layer owns the transaction boundary and the
//! compare-and-set writes that make these rules hold under concurrency.

use rust_decimal::Decimal;

use super::error::StockError;
use super::types::{LotKey, Movement};

/// Stateless service for stock movement rules.
pub struct StockService;

impl StockService {
    /// Validates a movement before it is applied.
    ///
    /// # Errors
    ///
    /// Returns an error for zero deltas or negative unit costs.
    pub fn validate_movement(movement: &Movement) -> Result<(), StockError> {
        if movement.delta == Decimal::ZERO {
            return Err(StockError::ZeroMovement);
        }
        if let Some(cost) = movement.unit_cost
            && cost < Decimal::ZERO
        {
            return Err(StockError::NegativeUnitCost);
        }
        Ok(())
    }

    /// Computes the quantity a lot would hold after a delta.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::InsufficientStock`] when the delta would take
    /// the lot below zero; the caller must then apply nothing.
    pub fn apply_delta(
        key: &LotKey,
        available: Decimal,
        delta: Decimal,
    ) -> Result<Decimal, StockError> {
        let next = available + delta;
        if next < Decimal::ZERO {
            return Err(StockError::InsufficientStock {
                key: key.clone(),
                requested: -delta,
                available,
            });
        }
        Ok(next)
    }

    /// Validates an absolute-set adjustment target.
    ///
    /// # Errors
    ///
    /// Returns an error when the target quantity is negative.
    pub fn validate_adjustment(new_quantity: Decimal) -> Result<(), StockError> {
        if new_quantity < Decimal::ZERO {
            return Err(StockError::NegativeAdjustment {
                requested: new_quantity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::types::MovementKind;
    use rust_decimal_macros::dec;
    use stockbook_shared::types::{ProductId, WarehouseId};

    fn key() -> LotKey {
        LotKey::batchless(ProductId::new(), WarehouseId::new())
    }

    #[test]
    fn test_outbound_within_stock() {
        let next = StockService::apply_delta(&key(), dec!(10), dec!(-3)).unwrap();
        assert_eq!(next, dec!(7));
    }

    #[test]
    fn test_outbound_to_exactly_zero() {
        let next = StockService::apply_delta(&key(), dec!(4), dec!(-4)).unwrap();
        assert_eq!(next, Decimal::ZERO);
    }

    #[test]
    fn test_overselling_reports_requested_and_available() {
        let err = StockService::apply_delta(&key(), dec!(2), dec!(-5)).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientStock { requested, available, .. }
                if requested == dec!(5) && available == dec!(2)
        ));
    }

    #[test]
    fn test_outbound_from_empty_lot() {
        let err = StockService::apply_delta(&key(), Decimal::ZERO, dec!(-1)).unwrap_err();
        assert!(matches!(
            err,
            StockError::InsufficientStock { available, .. } if available == Decimal::ZERO
        ));
    }

    #[test]
    fn test_inbound_always_applies() {
        let next = StockService::apply_delta(&key(), dec!(2), dec!(5)).unwrap();
        assert_eq!(next, dec!(7));
    }

    #[test]
    fn test_zero_movement_rejected() {
        let movement = Movement {
            key: key(),
            delta: Decimal::ZERO,
            kind: MovementKind::Receipt,
            unit_cost: None,
            expiry_date: None,
        };
        assert_eq!(
            StockService::validate_movement(&movement),
            Err(StockError::ZeroMovement)
        );
    }

    #[test]
    fn test_negative_unit_cost_rejected() {
        let movement = Movement::inbound(
            key(),
            dec!(5),
            MovementKind::Receipt,
            Some(dec!(-1.00)),
            None,
        );
        assert_eq!(
            StockService::validate_movement(&movement),
            Err(StockError::NegativeUnitCost)
        );
    }

    #[test]
    fn test_adjustment_bounds() {
        assert!(StockService::validate_adjustment(Decimal::ZERO).is_ok());
        assert!(StockService::validate_adjustment(dec!(17.5)).is_ok());
        assert!(matches!(
            StockService::validate_adjustment(dec!(-1)),
            Err(StockError::NegativeAdjustment { .. })
        ));
    }
}
