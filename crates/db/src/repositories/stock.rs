//! Stock repository for lot quantities, transfers, and adjustments.
//!
//! Outbound movements go through a guarded update: the quantity change and
//! the non-negativity check happen in one statement, so two concurrent
//! issues can never both draw the same units. When the guard refuses, the
//! lot is re-read and the shortfall is reported with the requested and
//! available quantities; nothing is applied.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::stock::{
    ExpiredLotRow, LotKey, LowStockRow, Movement, MovementKind, StockError, StockService,
};
use stockbook_shared::types::{AdjustmentId, LotId, ProductId, WarehouseId};

use crate::entities::{products, stock_adjustments, stock_lots, warehouses};
use crate::events::{EventSender, StockEvent};

/// Error types for stock operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Movement references a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Movement references a warehouse that does not exist.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Transfers must move stock between two different warehouses.
    #[error("Transfer source and destination warehouse are the same")]
    SameWarehouse,

    /// Adjustments must say why.
    #[error("Adjustment reason cannot be empty")]
    ReasonRequired,

    /// Two writers raced on the same lot; the operation can be retried.
    #[error("Concurrent stock update for {0}")]
    Conflict(LotKey),

    /// Domain rule violation (insufficient stock, zero movement, ...).
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Stock repository for movement and snapshot operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
    events: Option<EventSender>,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, events: None }
    }

    /// Attaches an event sender; committed quantity changes are announced
    /// through it.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    fn emit_changed(&self, key: &LotKey, on_hand: Decimal) {
        if let Some(events) = &self.events {
            events.send(StockEvent::StockChanged {
                product: key.product,
                warehouse: key.warehouse,
                batch: key.batch.clone(),
                on_hand,
            });
        }
    }

    /// Applies a single movement in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::InsufficientStock`] when an outbound movement
    /// asks for more than the lot holds; the lot is left untouched.
    pub async fn apply_movement(
        &self,
        movement: &Movement,
    ) -> Result<stock_lots::Model, MovementError> {
        let txn = self.db.begin().await?;
        let lot = apply_movement_in(&txn, movement).await?;
        txn.commit().await?;

        self.emit_changed(&movement.key, lot.quantity);
        Ok(lot)
    }

    /// Moves stock between warehouses as one transaction.
    ///
    /// The outbound and inbound sides commit together or not at all, so a
    /// shortfall at the source leaves both warehouses untouched. The
    /// destination lot inherits the source lot's unit cost and expiry date.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::InsufficientStock`] when the source lot cannot
    /// cover the quantity.
    pub async fn transfer(
        &self,
        from: &LotKey,
        to_warehouse: WarehouseId,
        quantity: Decimal,
    ) -> Result<(stock_lots::Model, stock_lots::Model), MovementError> {
        if to_warehouse == from.warehouse {
            return Err(MovementError::SameWarehouse);
        }

        let txn = self.db.begin().await?;

        ensure_warehouse(&txn, to_warehouse.into_inner()).await?;
        let source = find_lot(&txn, from).await?;
        let (unit_cost, expiry_date) = source
            .map(|lot| (lot.unit_cost, lot.expiry_date))
            .unwrap_or((None, None));

        let outbound = Movement::outbound(from.clone(), quantity, MovementKind::TransferOut);
        let from_lot = apply_movement_in(&txn, &outbound).await?;

        let to_key = LotKey::new(from.product, to_warehouse, from.batch.clone());
        let inbound = Movement::inbound(
            to_key.clone(),
            quantity,
            MovementKind::TransferIn,
            unit_cost,
            expiry_date,
        );
        let to_lot = apply_movement_in(&txn, &inbound).await?;

        txn.commit().await?;

        self.emit_changed(from, from_lot.quantity);
        self.emit_changed(&to_key, to_lot.quantity);
        tracing::info!(
            product = %from.product,
            from = %from.warehouse,
            to = %to_warehouse,
            %quantity,
            "transferred stock"
        );
        Ok((from_lot, to_lot))
    }

    /// Sets a lot to an absolute quantity and records the correction.
    ///
    /// The audit row stores the previous and new quantities with the reason;
    /// the lot row itself holds only the current truth.
    ///
    /// # Errors
    ///
    /// Returns [`MovementError::ReasonRequired`] for a blank reason and a
    /// stock error for negative targets.
    pub async fn adjust(
        &self,
        key: &LotKey,
        new_quantity: Decimal,
        reason: &str,
    ) -> Result<stock_lots::Model, MovementError> {
        if reason.trim().is_empty() {
            return Err(MovementError::ReasonRequired);
        }
        StockService::validate_adjustment(new_quantity)?;

        let txn = self.db.begin().await?;

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let existing = find_lot(&txn, key).await?;
        let previous_quantity = existing
            .as_ref()
            .map_or(Decimal::ZERO, |lot| lot.quantity);

        let lot = match existing {
            Some(lot) => {
                let mut active: stock_lots::ActiveModel = lot.into();
                active.quantity = Set(new_quantity);
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => insert_lot(&txn, key, new_quantity, None, None).await?,
        };

        let audit = stock_adjustments::ActiveModel {
            id: Set(AdjustmentId::new().into_inner()),
            product_id: Set(key.product.into_inner()),
            warehouse_id: Set(key.warehouse.into_inner()),
            batch: Set(key.storage_batch().to_string()),
            previous_quantity: Set(previous_quantity),
            new_quantity: Set(new_quantity),
            reason: Set(reason.trim().to_string()),
            adjusted_at: Set(now),
        };
        audit.insert(&txn).await?;

        txn.commit().await?;

        self.emit_changed(key, lot.quantity);
        tracing::info!(
            lot = %key,
            %previous_quantity,
            %new_quantity,
            "adjusted stock"
        );
        Ok(lot)
    }

    /// Returns the quantity on hand for a lot, zero when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn on_hand(&self, key: &LotKey) -> Result<Decimal, MovementError> {
        let lot = find_lot(&self.db, key).await?;
        Ok(lot.map_or(Decimal::ZERO, |l| l.quantity))
    }

    /// Lists the adjustment audit trail for a lot, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn adjustments_for(
        &self,
        key: &LotKey,
    ) -> Result<Vec<stock_adjustments::Model>, MovementError> {
        let rows = stock_adjustments::Entity::find()
            .filter(stock_adjustments::Column::ProductId.eq(key.product.into_inner()))
            .filter(stock_adjustments::Column::WarehouseId.eq(key.warehouse.into_inner()))
            .filter(stock_adjustments::Column::Batch.eq(key.storage_batch()))
            .order_by_desc(stock_adjustments::Column::AdjustedAt)
            .order_by_desc(stock_adjustments::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Sums on-hand per product and warehouse across batches and returns the
    /// combinations at or below the threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn low_stock_snapshot(
        &self,
        threshold: Decimal,
    ) -> Result<Vec<LowStockRow>, MovementError> {
        let rows: Vec<(Uuid, Uuid, Decimal)> = stock_lots::Entity::find()
            .select_only()
            .column(stock_lots::Column::ProductId)
            .column(stock_lots::Column::WarehouseId)
            .column_as(stock_lots::Column::Quantity.sum(), "on_hand")
            .group_by(stock_lots::Column::ProductId)
            .group_by(stock_lots::Column::WarehouseId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let snapshot = rows
            .into_iter()
            .filter(|(_, _, on_hand)| *on_hand <= threshold)
            .map(|(product, warehouse, on_hand)| LowStockRow {
                product: ProductId::from_uuid(product),
                warehouse: WarehouseId::from_uuid(warehouse),
                on_hand,
            })
            .collect();
        Ok(snapshot)
    }

    /// Lists lots whose expiry date lies before `as_of` and that still hold
    /// stock. A lot expiring today is not yet expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn expired_snapshot(
        &self,
        as_of: chrono::NaiveDate,
    ) -> Result<Vec<ExpiredLotRow>, MovementError> {
        let lots = stock_lots::Entity::find()
            .filter(stock_lots::Column::ExpiryDate.lt(as_of))
            .filter(stock_lots::Column::Quantity.gt(Decimal::ZERO))
            .order_by_asc(stock_lots::Column::ExpiryDate)
            .all(&self.db)
            .await?;

        let snapshot = lots
            .into_iter()
            .filter_map(|lot| {
                lot.expiry_date.map(|expiry_date| ExpiredLotRow {
                    product: ProductId::from_uuid(lot.product_id),
                    warehouse: WarehouseId::from_uuid(lot.warehouse_id),
                    batch: if lot.batch.is_empty() {
                        None
                    } else {
                        Some(lot.batch)
                    },
                    expiry_date,
                    on_hand: lot.quantity,
                })
            })
            .collect();
        Ok(snapshot)
    }
}

/// Applies a movement on any connection, including inside an open
/// transaction. Document realization calls this so stock and ledger commit
/// together.
pub(crate) async fn apply_movement_in<C: ConnectionTrait>(
    conn: &C,
    movement: &Movement,
) -> Result<stock_lots::Model, MovementError> {
    StockService::validate_movement(movement)?;
    let key = &movement.key;
    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

    // Guarded in-place update: quantity change and floor check in one
    // statement.
    let update = stock_lots::Entity::update_many()
        .col_expr(
            stock_lots::Column::Quantity,
            Expr::col(stock_lots::Column::Quantity).add(movement.delta),
        )
        .col_expr(stock_lots::Column::UpdatedAt, Expr::value(now))
        .filter(stock_lots::Column::ProductId.eq(key.product.into_inner()))
        .filter(stock_lots::Column::WarehouseId.eq(key.warehouse.into_inner()))
        .filter(stock_lots::Column::Batch.eq(key.storage_batch()))
        .filter(
            Expr::col(stock_lots::Column::Quantity)
                .add(movement.delta)
                .gte(Decimal::ZERO),
        )
        .exec(conn)
        .await?;

    if update.rows_affected == 0 {
        return match find_lot(conn, key).await? {
            Some(lot) => {
                // Row exists but the guard refused: the delta would go
                // negative.
                StockService::apply_delta(key, lot.quantity, movement.delta)?;
                Err(MovementError::Conflict(key.clone()))
            }
            None if movement.delta > Decimal::ZERO => {
                ensure_product(conn, key.product.into_inner()).await?;
                ensure_warehouse(conn, key.warehouse.into_inner()).await?;
                first_receipt(conn, movement).await
            }
            None => {
                StockService::apply_delta(key, Decimal::ZERO, movement.delta)?;
                Err(MovementError::Conflict(key.clone()))
            }
        };
    }

    find_lot(conn, key)
        .await?
        .ok_or_else(|| MovementError::Conflict(key.clone()))
}

/// Creates the lot for the first inbound movement. A concurrent first
/// receipt loses the unique-index race and falls back to the in-place
/// update.
async fn first_receipt<C: ConnectionTrait>(
    conn: &C,
    movement: &Movement,
) -> Result<stock_lots::Model, MovementError> {
    let key = &movement.key;
    match insert_lot(
        conn,
        key,
        movement.delta,
        movement.unit_cost,
        movement.expiry_date,
    )
    .await
    {
        Ok(lot) => Ok(lot),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let retry = stock_lots::Entity::update_many()
                .col_expr(
                    stock_lots::Column::Quantity,
                    Expr::col(stock_lots::Column::Quantity).add(movement.delta),
                )
                .filter(stock_lots::Column::ProductId.eq(key.product.into_inner()))
                .filter(stock_lots::Column::WarehouseId.eq(key.warehouse.into_inner()))
                .filter(stock_lots::Column::Batch.eq(key.storage_batch()))
                .exec(conn)
                .await?;
            if retry.rows_affected == 0 {
                return Err(MovementError::Conflict(key.clone()));
            }
            find_lot(conn, key)
                .await?
                .ok_or_else(|| MovementError::Conflict(key.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn insert_lot<C: ConnectionTrait>(
    conn: &C,
    key: &LotKey,
    quantity: Decimal,
    unit_cost: Option<Decimal>,
    expiry_date: Option<chrono::NaiveDate>,
) -> Result<stock_lots::Model, DbErr> {
    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
    let lot = stock_lots::ActiveModel {
        id: Set(LotId::new().into_inner()),
        product_id: Set(key.product.into_inner()),
        warehouse_id: Set(key.warehouse.into_inner()),
        batch: Set(key.storage_batch().to_string()),
        quantity: Set(quantity),
        unit_cost: Set(unit_cost),
        expiry_date: Set(expiry_date),
        created_at: Set(now),
        updated_at: Set(now),
    };
    lot.insert(conn).await
}

async fn find_lot<C: ConnectionTrait>(
    conn: &C,
    key: &LotKey,
) -> Result<Option<stock_lots::Model>, DbErr> {
    stock_lots::Entity::find()
        .filter(stock_lots::Column::ProductId.eq(key.product.into_inner()))
        .filter(stock_lots::Column::WarehouseId.eq(key.warehouse.into_inner()))
        .filter(stock_lots::Column::Batch.eq(key.storage_batch()))
        .one(conn)
        .await
}

async fn ensure_product<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), MovementError> {
    products::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(MovementError::ProductNotFound(id))
}

async fn ensure_warehouse<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), MovementError> {
    warehouses::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(MovementError::WarehouseNotFound(id))
}
