//! `SeaORM` Entity for the ledger entries table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One side of a posting. Entries are grouped by `(source_type, source_id)`;
/// every group balances to the cent and is immutable once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    /// Debit amount, zero when the line credits.
    pub debit: Decimal,
    /// Credit amount, zero when the line debits.
    pub credit: Decimal,
    pub description: Option<String>,
    /// Lowercase `SourceType` string: document, refund, payment, reversal,
    /// manual.
    pub source_type: String,
    /// Identifier of the originating record; pairs with `source_type` to
    /// form the posting group.
    pub source_id: Uuid,
    pub posted_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
