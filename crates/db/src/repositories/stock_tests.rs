//! Integration tests for stock movements, transfers, adjustments, and
//! snapshots against an in-memory database.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use stockbook_core::stock::{LotKey, Movement, MovementKind, StockError};

use crate::repositories::stock::{MovementError, StockRepository};
use crate::repositories::support::{seed_product, seed_stock, seed_warehouse, test_db};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_receipt_creates_lot_then_accumulates() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    let lot = stock
        .apply_movement(&Movement::inbound(
            key.clone(),
            dec!(10),
            MovementKind::Receipt,
            Some(dec!(4)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(lot.quantity, dec!(10));
    assert_eq!(lot.unit_cost, Some(dec!(4)));

    let lot = stock
        .apply_movement(&Movement::inbound(
            key.clone(),
            dec!(5),
            MovementKind::Receipt,
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(lot.quantity, dec!(15));
    assert_eq!(stock.on_hand(&key).await.unwrap(), dec!(15));
}

#[tokio::test]
async fn test_issue_reduces_on_hand() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    seed_stock(&db, product, warehouse, dec!(10)).await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    stock
        .apply_movement(&Movement::outbound(key.clone(), dec!(3), MovementKind::Issue))
        .await
        .unwrap();
    assert_eq!(stock.on_hand(&key).await.unwrap(), dec!(7));
}

#[tokio::test]
async fn test_insufficient_stock_names_requested_and_available() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    seed_stock(&db, product, warehouse, dec!(2)).await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    let err = stock
        .apply_movement(&Movement::outbound(key.clone(), dec!(5), MovementKind::Issue))
        .await
        .unwrap_err();
    match err {
        MovementError::Stock(StockError::InsufficientStock {
            requested,
            available,
            ..
        }) => {
            assert_eq!(requested, dec!(5));
            assert_eq!(available, dec!(2));
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }

    // No partial write.
    assert_eq!(stock.on_hand(&key).await.unwrap(), dec!(2));
}

#[tokio::test]
async fn test_outbound_from_missing_lot_reports_zero_available() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    let err = stock
        .apply_movement(&Movement::outbound(key, dec!(1), MovementKind::Issue))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MovementError::Stock(StockError::InsufficientStock {
            available,
            ..
        }) if available == dec!(0)
    ));
}

#[tokio::test]
async fn test_transfer_moves_stock_and_carries_cost() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let main = seed_warehouse(&db, "MAIN").await;
    let branch = seed_warehouse(&db, "BRANCH").await;
    let stock = StockRepository::new(db.clone());
    let from = LotKey::batchless(product, main);

    stock
        .apply_movement(&Movement::inbound(
            from.clone(),
            dec!(10),
            MovementKind::Receipt,
            Some(dec!(2.5)),
            Some(date(2027, 3, 1)),
        ))
        .await
        .unwrap();

    let (from_lot, to_lot) = stock.transfer(&from, branch, dec!(4)).await.unwrap();
    assert_eq!(from_lot.quantity, dec!(6));
    assert_eq!(to_lot.quantity, dec!(4));
    assert_eq!(to_lot.unit_cost, Some(dec!(2.5)));
    assert_eq!(to_lot.expiry_date, Some(date(2027, 3, 1)));
}

#[tokio::test]
async fn test_failed_transfer_leaves_both_warehouses_unchanged() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let main = seed_warehouse(&db, "MAIN").await;
    let branch = seed_warehouse(&db, "BRANCH").await;
    seed_stock(&db, product, main, dec!(3)).await;
    let stock = StockRepository::new(db.clone());
    let from = LotKey::batchless(product, main);

    let err = stock.transfer(&from, branch, dec!(5)).await.unwrap_err();
    assert!(matches!(
        err,
        MovementError::Stock(StockError::InsufficientStock { .. })
    ));

    assert_eq!(stock.on_hand(&from).await.unwrap(), dec!(3));
    let to = LotKey::batchless(product, branch);
    assert_eq!(stock.on_hand(&to).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn test_transfer_to_same_warehouse_rejected() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let main = seed_warehouse(&db, "MAIN").await;
    seed_stock(&db, product, main, dec!(3)).await;
    let stock = StockRepository::new(db.clone());
    let from = LotKey::batchless(product, main);

    let err = stock.transfer(&from, main, dec!(1)).await.unwrap_err();
    assert!(matches!(err, MovementError::SameWarehouse));
}

#[tokio::test]
async fn test_adjust_sets_quantity_and_writes_audit_row() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    seed_stock(&db, product, warehouse, dec!(10)).await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    let lot = stock.adjust(&key, dec!(4), "water damage").await.unwrap();
    assert_eq!(lot.quantity, dec!(4));

    let trail = stock.adjustments_for(&key).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].previous_quantity, dec!(10));
    assert_eq!(trail[0].new_quantity, dec!(4));
    assert_eq!(trail[0].reason, "water damage");
}

#[tokio::test]
async fn test_adjust_requires_reason_and_non_negative_target() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    seed_stock(&db, product, warehouse, dec!(10)).await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::batchless(product, warehouse);

    let blank = stock.adjust(&key, dec!(4), "   ").await.unwrap_err();
    assert!(matches!(blank, MovementError::ReasonRequired));

    let negative = stock.adjust(&key, dec!(-1), "typo").await.unwrap_err();
    assert!(matches!(
        negative,
        MovementError::Stock(StockError::NegativeAdjustment { .. })
    ));
    assert_eq!(stock.on_hand(&key).await.unwrap(), dec!(10));
}

#[tokio::test]
async fn test_adjust_creates_missing_lot_from_zero() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());
    let key = LotKey::new(product, warehouse, Some("FOUND-1".to_string()));

    let lot = stock.adjust(&key, dec!(7), "found in stocktake").await.unwrap();
    assert_eq!(lot.quantity, dec!(7));

    let trail = stock.adjustments_for(&key).await.unwrap();
    assert_eq!(trail[0].previous_quantity, dec!(0));
}

#[tokio::test]
async fn test_low_stock_snapshot_sums_batches_per_warehouse() {
    let db = test_db().await;
    let scarce = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let plenty = seed_product(&db, "WID-2", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());

    for (batch, quantity) in [("B1", dec!(2)), ("B2", dec!(1))] {
        stock
            .apply_movement(&Movement::inbound(
                LotKey::new(scarce, warehouse, Some(batch.to_string())),
                quantity,
                MovementKind::Receipt,
                None,
                None,
            ))
            .await
            .unwrap();
    }
    seed_stock(&db, plenty, warehouse, dec!(50)).await;

    let snapshot = stock.low_stock_snapshot(dec!(10)).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].product, scarce);
    assert_eq!(snapshot[0].warehouse, warehouse);
    assert_eq!(snapshot[0].on_hand, dec!(3));
}

#[tokio::test]
async fn test_expired_snapshot_is_strictly_before_cutoff() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());

    let stale = LotKey::new(product, warehouse, Some("OLD".to_string()));
    stock
        .apply_movement(&Movement::inbound(
            stale.clone(),
            dec!(5),
            MovementKind::Receipt,
            None,
            Some(date(2026, 1, 31)),
        ))
        .await
        .unwrap();
    stock
        .apply_movement(&Movement::inbound(
            LotKey::new(product, warehouse, Some("TODAY".to_string())),
            dec!(5),
            MovementKind::Receipt,
            None,
            Some(date(2026, 6, 1)),
        ))
        .await
        .unwrap();
    stock
        .apply_movement(&Movement::inbound(
            LotKey::new(product, warehouse, Some("FRESH".to_string())),
            dec!(5),
            MovementKind::Receipt,
            None,
            Some(date(2026, 12, 1)),
        ))
        .await
        .unwrap();

    let snapshot = stock.expired_snapshot(date(2026, 6, 1)).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].batch.as_deref(), Some("OLD"));
    assert_eq!(snapshot[0].expiry_date, date(2026, 1, 31));
    assert_eq!(snapshot[0].on_hand, dec!(5));

    // Issuing the lot down to zero drops it from the snapshot.
    stock
        .apply_movement(&Movement::outbound(stale, dec!(5), MovementKind::Issue))
        .await
        .unwrap();
    let snapshot = stock.expired_snapshot(date(2026, 6, 1)).await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_committed_movements_announce_resulting_on_hand() {
    let db = test_db().await;
    let product = seed_product(&db, "WID-1", dec!(4), dec!(10)).await;
    let main = seed_warehouse(&db, "MAIN").await;
    let branch = seed_warehouse(&db, "BRANCH").await;
    let (events, mut rx) = crate::events::channel(8);
    let stock = StockRepository::new(db.clone()).with_events(events);
    let key = LotKey::batchless(product, main);

    stock
        .apply_movement(&Movement::inbound(
            key.clone(),
            dec!(10),
            MovementKind::Receipt,
            None,
            None,
        ))
        .await
        .unwrap();
    match rx.try_recv().unwrap() {
        crate::events::StockEvent::StockChanged {
            product: p,
            warehouse,
            batch,
            on_hand,
        } => {
            assert_eq!(p, product);
            assert_eq!(warehouse, main);
            assert_eq!(batch, None);
            assert_eq!(on_hand, dec!(10));
        }
        other => panic!("expected stock change, got {other:?}"),
    }

    // A transfer announces both sides.
    stock.transfer(&key, branch, dec!(4)).await.unwrap();
    let quantities: Vec<_> = [rx.try_recv().unwrap(), rx.try_recv().unwrap()]
        .into_iter()
        .map(|event| match event {
            crate::events::StockEvent::StockChanged { on_hand, .. } => on_hand,
            other => panic!("expected stock change, got {other:?}"),
        })
        .collect();
    assert_eq!(quantities, vec![dec!(6), dec!(4)]);

    // A refused movement announces nothing.
    let _ = stock
        .apply_movement(&Movement::outbound(key, dec!(50), MovementKind::Issue))
        .await
        .unwrap_err();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_movement_for_unknown_product_rejected() {
    let db = test_db().await;
    let warehouse = seed_warehouse(&db, "MAIN").await;
    let stock = StockRepository::new(db.clone());
    let ghost = stockbook_shared::types::ProductId::new();
    let key = LotKey::batchless(ghost, warehouse);

    let err = stock
        .apply_movement(&Movement::inbound(key, dec!(5), MovementKind::Receipt, None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, MovementError::ProductNotFound(id) if id == ghost.into_inner()));
}
