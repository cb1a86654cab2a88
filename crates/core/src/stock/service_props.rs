//! Property-based tests for stock quantity arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_shared::types::{ProductId, WarehouseId};
use uuid::Uuid;

use super::error::StockError;
use super::service::StockService;
use super::types::LotKey;

fn arb_key() -> impl Strategy<Value = LotKey> {
    (any::<u128>(), any::<u128>(), prop::option::of("[A-Z]{1,6}")).prop_map(
        |(product, warehouse, batch)| {
            LotKey::new(
                ProductId::from_uuid(Uuid::from_u128(product)),
                WarehouseId::from_uuid(Uuid::from_u128(warehouse)),
                batch,
            )
        },
    )
}

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A successful delta never leaves the lot negative.
    #[test]
    fn prop_quantity_never_negative(
        key in arb_key(),
        available in arb_quantity(),
        delta in (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3)),
    ) {
        if let Ok(next) = StockService::apply_delta(&key, available, delta) {
            prop_assert!(next >= Decimal::ZERO);
            prop_assert_eq!(next, available + delta);
        }
    }

    /// The delta fails exactly when it would overdraw the lot.
    #[test]
    fn prop_insufficient_iff_overdraw(
        key in arb_key(),
        available in arb_quantity(),
        requested in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3)),
    ) {
        let result = StockService::apply_delta(&key, available, -requested);
        if requested > available {
            prop_assert!(
                matches!(result, Err(StockError::InsufficientStock { .. })),
                "expected Err(StockError::InsufficientStock), got {:?}",
                result
            );
        } else {
            prop_assert_eq!(result.unwrap(), available - requested);
        }
    }

    /// The error reports the exact requested and available quantities.
    #[test]
    fn prop_error_carries_exact_amounts(
        key in arb_key(),
        available in arb_quantity(),
        excess in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3)),
    ) {
        let requested = available + excess;
        let err = StockService::apply_delta(&key, available, -requested).unwrap_err();
        prop_assert_eq!(
            err,
            StockError::InsufficientStock { key, requested, available }
        );
    }

    /// Receiving then issuing the same quantity restores the lot.
    #[test]
    fn prop_in_then_out_round_trips(
        key in arb_key(),
        available in arb_quantity(),
        quantity in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3)),
    ) {
        let after_in = StockService::apply_delta(&key, available, quantity).unwrap();
        let after_out = StockService::apply_delta(&key, after_in, -quantity).unwrap();
        prop_assert_eq!(after_out, available);
    }

    /// Inbound deltas always succeed.
    #[test]
    fn prop_inbound_always_succeeds(
        key in arb_key(),
        available in arb_quantity(),
        quantity in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 3)),
    ) {
        prop_assert!(StockService::apply_delta(&key, available, quantity).is_ok());
    }
}
