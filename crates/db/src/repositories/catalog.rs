//! Product and warehouse repositories.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use stockbook_shared::types::{ProductId, WarehouseId};

use crate::entities::{products, warehouses};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Product SKU already exists.
    #[error("Product SKU '{0}' already exists")]
    DuplicateSku(String),

    /// Warehouse code already exists.
    #[error("Warehouse code '{0}' already exists")]
    DuplicateCode(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Prices cannot be negative.
    #[error("Price cannot be negative")]
    NegativePrice,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Stock keeping unit, unique.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Cost per unit, drives COGS postings.
    pub cost_price: Decimal,
    /// Default selling price per unit.
    pub sale_price: Decimal,
}

/// Product repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product with a unique SKU.
    ///
    /// # Errors
    ///
    /// Returns an error when the SKU is taken or a price is negative.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        if input.cost_price < Decimal::ZERO || input.sale_price < Decimal::ZERO {
            return Err(CatalogError::NegativePrice);
        }

        let existing = products::Entity::find()
            .filter(products::Column::Sku.eq(&input.sku))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateSku(input.sku));
        }

        let now = chrono::Utc::now().into();
        let product = products::ActiveModel {
            id: Set(ProductId::new().into_inner()),
            sku: Set(input.sku),
            name: Set(input.name),
            cost_price: Set(input.cost_price),
            sale_price: Set(input.sale_price),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let product = product.insert(&self.db).await?;
        Ok(product)
    }

    /// Finds a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no such product exists.
    pub async fn find_by_id(&self, id: ProductId) -> Result<products::Model, CatalogError> {
        products::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id.into_inner()))
    }

    /// Finds a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<products::Model>, CatalogError> {
        let product = products::Entity::find()
            .filter(products::Column::Sku.eq(sku))
            .one(&self.db)
            .await?;
        Ok(product)
    }

    /// Lists products ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_products(&self) -> Result<Vec<products::Model>, CatalogError> {
        let rows = products::Entity::find()
            .order_by_asc(products::Column::Sku)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Updates a product's prices.
    ///
    /// # Errors
    ///
    /// Returns an error when a price is negative or the product is missing.
    pub async fn update_prices(
        &self,
        id: ProductId,
        cost_price: Decimal,
        sale_price: Decimal,
    ) -> Result<products::Model, CatalogError> {
        if cost_price < Decimal::ZERO || sale_price < Decimal::ZERO {
            return Err(CatalogError::NegativePrice);
        }
        let product = self.find_by_id(id).await?;

        let mut active: products::ActiveModel = product.into();
        active.cost_price = Set(cost_price);
        active.sale_price = Set(sale_price);
        active.updated_at = Set(chrono::Utc::now().into());

        let product = active.update(&self.db).await?;
        Ok(product)
    }
}

/// Input for creating a warehouse.
#[derive(Debug, Clone)]
pub struct CreateWarehouseInput {
    /// Warehouse code, unique.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Warehouse repository for catalog operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    db: DatabaseConnection,
}

impl WarehouseRepository {
    /// Creates a new warehouse repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a warehouse with a unique code.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] when the code is taken.
    pub async fn create_warehouse(
        &self,
        input: CreateWarehouseInput,
    ) -> Result<warehouses::Model, CatalogError> {
        let existing = warehouses::Entity::find()
            .filter(warehouses::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let warehouse = warehouses::ActiveModel {
            id: Set(WarehouseId::new().into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let warehouse = warehouse.insert(&self.db).await?;
        Ok(warehouse)
    }

    /// Finds a warehouse by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::WarehouseNotFound`] if no such warehouse
    /// exists.
    pub async fn find_by_id(&self, id: WarehouseId) -> Result<warehouses::Model, CatalogError> {
        warehouses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::WarehouseNotFound(id.into_inner()))
    }

    /// Finds a warehouse by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<warehouses::Model>, CatalogError> {
        let warehouse = warehouses::Entity::find()
            .filter(warehouses::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(warehouse)
    }

    /// Lists warehouses ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_warehouses(&self) -> Result<Vec<warehouses::Model>, CatalogError> {
        let rows = warehouses::Entity::find()
            .order_by_asc(warehouses::Column::Code)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}
