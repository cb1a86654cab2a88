//! `SeaORM` Entity for the payments table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Money movement outside the document flow: receipts, supplier payments,
/// expenses and cash/bank transfers. Each payment posts exactly one
/// balanced pair to the ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Lowercase `PaymentKind` string.
    pub kind: String,
    /// Lowercase `PaymentMethod` string: cash, bank.
    pub method: String,
    pub amount: Decimal,
    /// Human-facing payment number, unique.
    pub reference: String,
    /// Document settled by this payment, when any.
    pub document_id: Option<Uuid>,
    /// Cost account debited by expense payments.
    pub expense_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub paid_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id"
    )]
    Documents,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ExpenseAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
