//! Shared fixtures for repository tests: an in-memory database with the
//! schema applied, plus seed helpers for the chart and the catalog.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use stockbook_core::ledger::WellKnownAccount;
use stockbook_core::stock::{LotKey, Movement, MovementKind};
use stockbook_shared::types::{AccountId, ProductId, WarehouseId};

use crate::migration::Migrator;
use crate::repositories::account::{AccountRepository, CreateAccountInput};
use crate::repositories::catalog::{
    CreateProductInput, CreateWarehouseInput, ProductRepository, WarehouseRepository,
};
use crate::repositories::stock::StockRepository;

/// Fresh in-memory database with all migrations applied.
///
/// Capped at one pooled connection so the in-memory database stays alive
/// and isolated per test.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Seeds every well-known account and returns the chart.
pub async fn seed_chart(db: &DatabaseConnection) -> HashMap<WellKnownAccount, AccountId> {
    let accounts = AccountRepository::new(db.clone());
    let mut chart = HashMap::new();
    for account in WellKnownAccount::ALL {
        let created = accounts
            .create_account(CreateAccountInput {
                code: account.code().to_string(),
                name: account.default_name().to_string(),
                account_type: account.account_type(),
                parent: None,
            })
            .await
            .expect("seed account");
        chart.insert(account, AccountId::from_uuid(created.id));
    }
    chart
}

/// Seeds one product with the given prices.
pub async fn seed_product(
    db: &DatabaseConnection,
    sku: &str,
    cost_price: Decimal,
    sale_price: Decimal,
) -> ProductId {
    let products = ProductRepository::new(db.clone());
    let created = products
        .create_product(CreateProductInput {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            cost_price,
            sale_price,
        })
        .await
        .expect("seed product");
    ProductId::from_uuid(created.id)
}

/// Seeds one warehouse.
pub async fn seed_warehouse(db: &DatabaseConnection, code: &str) -> WarehouseId {
    let warehouses = WarehouseRepository::new(db.clone());
    let created = warehouses
        .create_warehouse(CreateWarehouseInput {
            code: code.to_string(),
            name: format!("Warehouse {code}"),
        })
        .await
        .expect("seed warehouse");
    WarehouseId::from_uuid(created.id)
}

/// Receives the given quantity into an unbatched lot.
pub async fn seed_stock(
    db: &DatabaseConnection,
    product: ProductId,
    warehouse: WarehouseId,
    quantity: Decimal,
) {
    let stock = StockRepository::new(db.clone());
    stock
        .apply_movement(&Movement::inbound(
            LotKey::batchless(product, warehouse),
            quantity,
            MovementKind::Receipt,
            None,
            None,
        ))
        .await
        .expect("seed stock");
}
