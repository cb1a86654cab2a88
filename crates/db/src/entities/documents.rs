//! `SeaORM` Entity for the documents table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Business document header. Sales, purchases and returns share this table;
/// the return-specific columns stay NULL on anything that is not a return.
///
/// `tax_rate` is captured from policy at creation time, so later policy
/// changes never silently reprice an existing document.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Lowercase `DocumentKind` string: sale, purchase, sale_return,
    /// purchase_return.
    pub kind: String,
    /// Lowercase `DocumentStatus` string: draft, pending, completed,
    /// approved, cancelled.
    pub status: String,
    /// Human-facing document number, unique.
    pub reference: String,
    pub warehouse_id: Uuid,
    /// Customer or supplier name.
    pub counterparty: Option<String>,
    /// Tax rate in percent captured at creation.
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    /// Amount settled so far, capped at `total`.
    pub paid_amount: Decimal,
    pub notes: Option<String>,
    /// Parent document for returns.
    pub parent_id: Option<Uuid>,
    /// Why the goods came back; returns only.
    pub return_reason: Option<String>,
    /// Lowercase `RefundStatus` string, sale returns only.
    pub refund_status: Option<String>,
    /// Lowercase `PaymentMethod` string of the payout, set once refunded.
    pub refund_method: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTimeWithTimeZone>,
    /// Set when stock and ledger effects were applied.
    pub realized_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouses,
    #[sea_orm(has_many = "super::document_lines::Entity")]
    DocumentLines,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl Related<super::document_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
