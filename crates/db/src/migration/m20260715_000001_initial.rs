//! Initial database migration.
//!
//! Creates the chart of accounts, ledger, catalog, stock and document
//! tables with their indexes. Written with the portable DSL; no
//! database-specific SQL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: CHART OF ACCOUNTS & LEDGER
        // ============================================================
        create_accounts(manager).await?;
        create_ledger_entries(manager).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        create_products(manager).await?;
        create_warehouses(manager).await?;

        // ============================================================
        // PART 3: STOCK
        // ============================================================
        create_stock_lots(manager).await?;
        create_stock_adjustments(manager).await?;

        // ============================================================
        // PART 4: DOCUMENTS & PAYMENTS
        // ============================================================
        create_documents(manager).await?;
        create_document_lines(manager).await?;
        create_payments(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockAdjustments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockLots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

async fn create_accounts(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Accounts::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Accounts::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Accounts::Code).string().not_null())
                .col(ColumnDef::new(Accounts::Name).string().not_null())
                .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                .col(ColumnDef::new(Accounts::ParentId).uuid().null())
                .col(ColumnDef::new(Accounts::IsActive).boolean().not_null())
                .col(
                    ColumnDef::new(Accounts::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Accounts::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_accounts_parent_id")
                        .from(Accounts::Table, Accounts::ParentId)
                        .to(Accounts::Table, Accounts::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_accounts_code")
                .table(Accounts::Table)
                .col(Accounts::Code)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_ledger_entries(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(LedgerEntries::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(LedgerEntries::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(LedgerEntries::AccountId).uuid().not_null())
                .col(
                    ColumnDef::new(LedgerEntries::Debit)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(LedgerEntries::Credit)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(LedgerEntries::Description).text().null())
                .col(ColumnDef::new(LedgerEntries::SourceType).string().not_null())
                .col(ColumnDef::new(LedgerEntries::SourceId).uuid().not_null())
                .col(
                    ColumnDef::new(LedgerEntries::PostedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(LedgerEntries::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_ledger_entries_account_id")
                        .from(LedgerEntries::Table, LedgerEntries::AccountId)
                        .to(Accounts::Table, Accounts::Id),
                )
                .to_owned(),
        )
        .await?;

    // Balance queries scan one account up to a cutoff date.
    manager
        .create_index(
            Index::create()
                .name("idx_ledger_entries_account_posted")
                .table(LedgerEntries::Table)
                .col(LedgerEntries::AccountId)
                .col(LedgerEntries::PostedAt)
                .to_owned(),
        )
        .await?;

    // Posting groups are addressed by their source for reversal.
    manager
        .create_index(
            Index::create()
                .name("idx_ledger_entries_source")
                .table(LedgerEntries::Table)
                .col(LedgerEntries::SourceType)
                .col(LedgerEntries::SourceId)
                .to_owned(),
        )
        .await
}

async fn create_products(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Products::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Products::Sku).string().not_null())
                .col(ColumnDef::new(Products::Name).string().not_null())
                .col(
                    ColumnDef::new(Products::CostPrice)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Products::SalePrice)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(Products::IsActive).boolean().not_null())
                .col(
                    ColumnDef::new(Products::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Products::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_products_sku")
                .table(Products::Table)
                .col(Products::Sku)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_warehouses(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Warehouses::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Warehouses::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Warehouses::Code).string().not_null())
                .col(ColumnDef::new(Warehouses::Name).string().not_null())
                .col(ColumnDef::new(Warehouses::IsActive).boolean().not_null())
                .col(
                    ColumnDef::new(Warehouses::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Warehouses::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_warehouses_code")
                .table(Warehouses::Table)
                .col(Warehouses::Code)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_stock_lots(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(StockLots::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(StockLots::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(StockLots::ProductId).uuid().not_null())
                .col(ColumnDef::new(StockLots::WarehouseId).uuid().not_null())
                // Empty string for the unbatched bucket; NULL would escape
                // the unique key below.
                .col(ColumnDef::new(StockLots::Batch).string().not_null())
                .col(
                    ColumnDef::new(StockLots::Quantity)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(StockLots::UnitCost)
                        .decimal_len(19, 4)
                        .null(),
                )
                .col(ColumnDef::new(StockLots::ExpiryDate).date().null())
                .col(
                    ColumnDef::new(StockLots::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(StockLots::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_stock_lots_product_id")
                        .from(StockLots::Table, StockLots::ProductId)
                        .to(Products::Table, Products::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_stock_lots_warehouse_id")
                        .from(StockLots::Table, StockLots::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_stock_lots_key")
                .table(StockLots::Table)
                .col(StockLots::ProductId)
                .col(StockLots::WarehouseId)
                .col(StockLots::Batch)
                .unique()
                .to_owned(),
        )
        .await?;

    // Expiry snapshot scans by date.
    manager
        .create_index(
            Index::create()
                .name("idx_stock_lots_expiry")
                .table(StockLots::Table)
                .col(StockLots::ExpiryDate)
                .to_owned(),
        )
        .await
}

async fn create_stock_adjustments(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(StockAdjustments::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(StockAdjustments::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(StockAdjustments::ProductId).uuid().not_null())
                .col(
                    ColumnDef::new(StockAdjustments::WarehouseId)
                        .uuid()
                        .not_null(),
                )
                .col(ColumnDef::new(StockAdjustments::Batch).string().not_null())
                .col(
                    ColumnDef::new(StockAdjustments::PreviousQuantity)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(StockAdjustments::NewQuantity)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(StockAdjustments::Reason).text().not_null())
                .col(
                    ColumnDef::new(StockAdjustments::AdjustedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_stock_adjustments_product_id")
                        .from(StockAdjustments::Table, StockAdjustments::ProductId)
                        .to(Products::Table, Products::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_stock_adjustments_warehouse_id")
                        .from(StockAdjustments::Table, StockAdjustments::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_stock_adjustments_lot")
                .table(StockAdjustments::Table)
                .col(StockAdjustments::ProductId)
                .col(StockAdjustments::WarehouseId)
                .to_owned(),
        )
        .await
}

async fn create_documents(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Documents::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Documents::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Documents::Kind).string().not_null())
                .col(ColumnDef::new(Documents::Status).string().not_null())
                .col(ColumnDef::new(Documents::Reference).string().not_null())
                .col(ColumnDef::new(Documents::WarehouseId).uuid().not_null())
                .col(ColumnDef::new(Documents::Counterparty).string().null())
                .col(
                    ColumnDef::new(Documents::TaxRate)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::Subtotal)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::TaxAmount)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::DiscountAmount)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::Total)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::PaidAmount)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(Documents::Notes).text().null())
                .col(ColumnDef::new(Documents::ParentId).uuid().null())
                .col(ColumnDef::new(Documents::ReturnReason).text().null())
                .col(ColumnDef::new(Documents::RefundStatus).string().null())
                .col(ColumnDef::new(Documents::RefundMethod).string().null())
                .col(
                    ColumnDef::new(Documents::RefundAmount)
                        .decimal_len(19, 4)
                        .null(),
                )
                .col(
                    ColumnDef::new(Documents::RefundedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Documents::RealizedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Documents::CancelledAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Documents::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Documents::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_documents_warehouse_id")
                        .from(Documents::Table, Documents::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_documents_parent_id")
                        .from(Documents::Table, Documents::ParentId)
                        .to(Documents::Table, Documents::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_documents_reference")
                .table(Documents::Table)
                .col(Documents::Reference)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_documents_kind_status")
                .table(Documents::Table)
                .col(Documents::Kind)
                .col(Documents::Status)
                .to_owned(),
        )
        .await?;

    // Returns are listed per parent when computing open quantities.
    manager
        .create_index(
            Index::create()
                .name("idx_documents_parent")
                .table(Documents::Table)
                .col(Documents::ParentId)
                .to_owned(),
        )
        .await
}

async fn create_document_lines(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(DocumentLines::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(DocumentLines::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(DocumentLines::DocumentId).uuid().not_null())
                .col(ColumnDef::new(DocumentLines::ProductId).uuid().not_null())
                .col(
                    ColumnDef::new(DocumentLines::Quantity)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DocumentLines::UnitPrice)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DocumentLines::LineTotal)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(DocumentLines::Batch).string().null())
                .col(ColumnDef::new(DocumentLines::ExpiryDate).date().null())
                .col(
                    ColumnDef::new(DocumentLines::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_document_lines_document_id")
                        .from(DocumentLines::Table, DocumentLines::DocumentId)
                        .to(Documents::Table, Documents::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_document_lines_product_id")
                        .from(DocumentLines::Table, DocumentLines::ProductId)
                        .to(Products::Table, Products::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_document_lines_document")
                .table(DocumentLines::Table)
                .col(DocumentLines::DocumentId)
                .to_owned(),
        )
        .await
}

async fn create_payments(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Payments::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Payments::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(ColumnDef::new(Payments::Kind).string().not_null())
                .col(ColumnDef::new(Payments::Method).string().not_null())
                .col(
                    ColumnDef::new(Payments::Amount)
                        .decimal_len(19, 4)
                        .not_null(),
                )
                .col(ColumnDef::new(Payments::Reference).string().not_null())
                .col(ColumnDef::new(Payments::DocumentId).uuid().null())
                .col(ColumnDef::new(Payments::ExpenseAccountId).uuid().null())
                .col(ColumnDef::new(Payments::Notes).text().null())
                .col(
                    ColumnDef::new(Payments::PaidAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Payments::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_payments_document_id")
                        .from(Payments::Table, Payments::DocumentId)
                        .to(Documents::Table, Documents::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_payments_expense_account_id")
                        .from(Payments::Table, Payments::ExpenseAccountId)
                        .to(Accounts::Table, Accounts::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_payments_reference")
                .table(Payments::Table)
                .col(Payments::Reference)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_payments_document")
                .table(Payments::Table)
                .col(Payments::DocumentId)
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    ParentId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    AccountId,
    Debit,
    Credit,
    Description,
    SourceType,
    SourceId,
    PostedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Sku,
    Name,
    CostPrice,
    SalePrice,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Warehouses {
    Table,
    Id,
    Code,
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StockLots {
    Table,
    Id,
    ProductId,
    WarehouseId,
    Batch,
    Quantity,
    UnitCost,
    ExpiryDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StockAdjustments {
    Table,
    Id,
    ProductId,
    WarehouseId,
    Batch,
    PreviousQuantity,
    NewQuantity,
    Reason,
    AdjustedAt,
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    Kind,
    Status,
    Reference,
    WarehouseId,
    Counterparty,
    TaxRate,
    Subtotal,
    TaxAmount,
    DiscountAmount,
    Total,
    PaidAmount,
    Notes,
    ParentId,
    ReturnReason,
    RefundStatus,
    RefundMethod,
    RefundAmount,
    RefundedAt,
    RealizedAt,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DocumentLines {
    Table,
    Id,
    DocumentId,
    ProductId,
    Quantity,
    UnitPrice,
    LineTotal,
    Batch,
    ExpiryDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    Kind,
    Method,
    Amount,
    Reference,
    DocumentId,
    ExpenseAccountId,
    Notes,
    PaidAt,
    CreatedAt,
}
