//! Database seeder for Stockbook development and testing.
//!
//! Seeds the well-known chart of accounts, warehouses, a small product
//! catalog, opening stock, and an opening journal. Safe to run repeatedly:
//! everything that already exists is skipped.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use stockbook_core::ledger::{AccountType, EntryInput, SourceType, WellKnownAccount};
use stockbook_core::stock::{LotKey, Movement, MovementKind};
use stockbook_db::repositories::{
    AccountRepository, CreateAccountInput, CreateProductInput, CreateWarehouseInput,
    LedgerRepository, ProductRepository, StockRepository, WarehouseRepository,
};
use stockbook_shared::types::{AccountId, ProductId, WarehouseId};

/// Chart code of the equity account the opening journal credits.
const OPENING_EQUITY_CODE: &str = "3000";

/// Opening cash and bank balances.
const OPENING_CASH: Decimal = dec!(5000);
const OPENING_BANK: Decimal = dec!(20000);

/// Catalog rows: sku, name, cost price, sale price, opening quantity,
/// expiry of the opening lot.
fn catalog() -> [(&'static str, &'static str, Decimal, Decimal, Decimal, Option<NaiveDate>); 6] {
    [
        ("HAM-01", "Claw Hammer", dec!(6.50), dec!(14.90), dec!(40), None),
        ("SCR-01", "Screwdriver Set", dec!(9.00), dec!(19.90), dec!(30), None),
        ("DRL-18V", "Cordless Drill 18V", dec!(48.00), dec!(99.00), dec!(12), None),
        ("NLS-50", "Nails 50mm Box", dec!(1.20), dec!(3.50), dec!(200), None),
        ("PLY-12", "Plywood Sheet 12mm", dec!(14.00), dec!(26.00), dec!(25), None),
        (
            "GLU-02",
            "Wood Glue 500ml",
            dec!(2.80),
            dec!(6.90),
            dec!(60),
            NaiveDate::from_ymd_opt(2027, 5, 31),
        ),
    ]
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = stockbook_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding chart of accounts...");
    seed_chart(&db).await;

    println!("Seeding warehouses...");
    seed_warehouses(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding opening stock...");
    seed_opening_stock(&db).await;

    println!("Posting opening journal...");
    seed_opening_journal(&db).await;

    println!("Seeding complete!");
}

/// Creates the account unless its code is already taken. Returns true when
/// a row was inserted.
async fn ensure_account(
    accounts: &AccountRepository,
    code: &str,
    name: &str,
    account_type: AccountType,
) -> bool {
    match accounts.find_by_code(code).await {
        Ok(Some(_)) => return false,
        Ok(None) => {}
        Err(e) => {
            eprintln!("  Failed to look up account {code}: {e}");
            return false;
        }
    }

    let input = CreateAccountInput {
        code: code.to_string(),
        name: name.to_string(),
        account_type,
        parent: None,
    };
    match accounts.create_account(input).await {
        Ok(_) => true,
        Err(e) => {
            eprintln!("  Failed to create account {code}: {e}");
            false
        }
    }
}

/// Seeds the well-known chart plus the opening-balance equity account.
async fn seed_chart(db: &DatabaseConnection) {
    let accounts = AccountRepository::new(db.clone());

    let mut created = 0;
    for account in WellKnownAccount::ALL {
        if ensure_account(
            &accounts,
            account.code(),
            account.default_name(),
            account.account_type(),
        )
        .await
        {
            created += 1;
        }
    }
    if ensure_account(
        &accounts,
        OPENING_EQUITY_CODE,
        "Opening Balances",
        AccountType::Equity,
    )
    .await
    {
        created += 1;
    }

    println!("  Created {created} accounts");
}

/// Seeds the development warehouses.
async fn seed_warehouses(db: &DatabaseConnection) {
    let warehouses = WarehouseRepository::new(db.clone());

    let mut created = 0;
    for (code, name) in [("MAIN", "Main Warehouse"), ("STORE", "Storefront")] {
        match warehouses.find_by_code(code).await {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                eprintln!("  Failed to look up warehouse {code}: {e}");
                continue;
            }
        }
        let input = CreateWarehouseInput {
            code: code.to_string(),
            name: name.to_string(),
        };
        if let Err(e) = warehouses.create_warehouse(input).await {
            eprintln!("  Failed to create warehouse {code}: {e}");
        } else {
            created += 1;
        }
    }

    println!("  Created {created} warehouses");
}

/// Seeds the product catalog.
async fn seed_products(db: &DatabaseConnection) {
    let products = ProductRepository::new(db.clone());

    let mut created = 0;
    for (sku, name, cost_price, sale_price, _, _) in catalog() {
        match products.find_by_sku(sku).await {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                eprintln!("  Failed to look up product {sku}: {e}");
                continue;
            }
        }
        let input = CreateProductInput {
            sku: sku.to_string(),
            name: name.to_string(),
            cost_price,
            sale_price,
        };
        if let Err(e) = products.create_product(input).await {
            eprintln!("  Failed to create product {sku}: {e}");
        } else {
            created += 1;
        }
    }

    println!("  Created {created} products");
}

/// Receives opening stock into the main warehouse, once per product.
async fn seed_opening_stock(db: &DatabaseConnection) {
    let products = ProductRepository::new(db.clone());
    let warehouses = WarehouseRepository::new(db.clone());
    let stock = StockRepository::new(db.clone());

    let main = match warehouses.find_by_code("MAIN").await {
        Ok(Some(row)) => WarehouseId::from_uuid(row.id),
        _ => {
            eprintln!("  Main warehouse missing, skipping opening stock");
            return;
        }
    };

    let mut received = 0;
    for (sku, _, cost_price, _, quantity, expiry) in catalog() {
        let Ok(Some(product)) = products.find_by_sku(sku).await else {
            eprintln!("  Product {sku} missing, skipping its opening stock");
            continue;
        };
        let key = LotKey::batchless(ProductId::from_uuid(product.id), main);

        match stock.on_hand(&key).await {
            Ok(on_hand) if on_hand > Decimal::ZERO => continue,
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Failed to read stock for {sku}: {e}");
                continue;
            }
        }

        let movement =
            Movement::inbound(key, quantity, MovementKind::Receipt, Some(cost_price), expiry);
        if let Err(e) = stock.apply_movement(&movement).await {
            eprintln!("  Failed to receive {sku}: {e}");
        } else {
            received += 1;
        }
    }

    println!("  Received opening stock for {received} products");
}

/// Posts the opening journal: cash, bank, and inventory value against the
/// opening equity account. Skipped once that account has entries.
async fn seed_opening_journal(db: &DatabaseConnection) {
    let accounts = AccountRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let equity = match accounts.find_by_code(OPENING_EQUITY_CODE).await {
        Ok(Some(row)) => AccountId::from_uuid(row.id),
        _ => {
            eprintln!("  Opening equity account missing, skipping journal");
            return;
        }
    };
    match ledger.entries_for_account(equity).await {
        Ok(entries) if !entries.is_empty() => {
            println!("  Opening journal already posted, skipping...");
            return;
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("  Failed to check opening journal: {e}");
            return;
        }
    }

    let chart = match accounts.well_known().await {
        Ok(chart) => chart,
        Err(e) => {
            eprintln!("  Failed to load the chart: {e}");
            return;
        }
    };
    let (Some(&cash), Some(&bank), Some(&inventory)) = (
        chart.get(&WellKnownAccount::Cash),
        chart.get(&WellKnownAccount::Bank),
        chart.get(&WellKnownAccount::Inventory),
    ) else {
        eprintln!("  Well-known accounts missing, skipping journal");
        return;
    };

    let stock_value: Decimal = catalog()
        .iter()
        .map(|(_, _, cost_price, _, quantity, _)| *cost_price * *quantity)
        .sum();
    let total = OPENING_CASH + OPENING_BANK + stock_value;

    let lines = vec![
        EntryInput::debit(cash, OPENING_CASH, "Opening cash"),
        EntryInput::debit(bank, OPENING_BANK, "Opening bank"),
        EntryInput::debit(inventory, stock_value, "Opening inventory"),
        EntryInput::credit(equity, total, "Opening balances"),
    ];
    match ledger.post_entries(SourceType::Manual, Uuid::now_v7(), lines).await {
        Ok(entries) => println!("  Posted opening journal ({} lines)", entries.len()),
        Err(e) => eprintln!("  Failed to post opening journal: {e}"),
    }
}
