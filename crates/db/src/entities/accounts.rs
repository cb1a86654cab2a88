//! `SeaORM` Entity for the accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chart of accounts row. Balances are never stored here; they are always
/// derived from ledger entries.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Chart code, unique. Well-known codes: 1000 cash, 1100 bank,
    /// 1200 receivable, 1300 inventory, 2000 payable, 4000 sales revenue,
    /// 4100 sales returns, 5000 cost of goods sold.
    pub code: String,
    pub name: String,
    /// Lowercase `AccountType` string: asset, liability, equity, income,
    /// expense.
    pub account_type: String,
    /// Parent account for chart grouping; `None` at the top level.
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
