//! Ledger repository for posting and reading journal entries.
//!
//! Posting groups are keyed by `(source_type, source_id)`. Groups are
//! append-only: corrections go through [`LedgerRepository::reverse_entries`],
//! which posts a fresh group with the sides swapped, never an update or
//! delete. Balances are derived from entries at read time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::ledger::{
    AccountBalance, AccountType, EntryInput, EntrySide, LedgerError, ReversalService, SourceType,
    validate_posting,
};
use stockbook_shared::types::{AccountId, EntryId};

use crate::entities::{accounts, ledger_entries};

/// Error types for posting operations.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// A line references an account that does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A stored column does not parse back into its domain type.
    #[error("Stored value '{value}' is not a valid {field}")]
    InvalidStored {
        /// Column that failed to parse.
        field: &'static str,
        /// Offending stored value.
        value: String,
    },

    /// The group failed double-entry validation.
    #[error(transparent)]
    Validation(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One row of a trial balance, ordered by chart code.
#[derive(Debug, Clone)]
pub struct TrialBalanceRow {
    /// Chart code of the account.
    pub code: String,
    /// Display name of the account.
    pub name: String,
    /// Derived balance with its debit/credit totals.
    pub balance: AccountBalance,
}

/// Ledger repository for journal entry operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a balanced group of entries as one atomic write.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the group does not balance, and
    /// [`PostingError::AccountNotFound`] when a line references a missing
    /// account. Nothing is written unless every line passes.
    pub async fn post_entries(
        &self,
        source_type: SourceType,
        source_id: Uuid,
        lines: Vec<EntryInput>,
    ) -> Result<Vec<ledger_entries::Model>, PostingError> {
        validate_posting(&lines)?;
        self.ensure_accounts_exist(&lines).await?;

        let txn = self.db.begin().await?;
        let inserted = post_group(&txn, source_type, source_id, &lines).await?;
        txn.commit().await?;

        tracing::info!(
            source_type = source_type.as_str(),
            %source_id,
            lines = inserted.len(),
            "posted ledger group"
        );
        Ok(inserted)
    }

    /// Posts a reversing group for already-posted entries.
    ///
    /// The reversal carries the same `(source_type, source_id)` pairing with
    /// source type [`SourceType::Reversal`], so the original and its
    /// reversal read back as one audit trail. A non-empty reason is stamped
    /// into the group description.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NothingToReverse`] when no entries exist for
    /// the source.
    pub async fn reverse_entries(
        &self,
        source_type: SourceType,
        source_id: Uuid,
        reason: &str,
    ) -> Result<Vec<ledger_entries::Model>, PostingError> {
        let original = self.entries_for_source(source_type, source_id).await?;
        let inputs = rows_to_inputs(&original);

        let label = format!("{} {source_id}", source_type.as_str());
        let plan = ReversalService::plan(&inputs, &label, reason)?;

        let txn = self.db.begin().await?;
        let inserted = post_group(&txn, SourceType::Reversal, source_id, &plan.lines).await?;
        txn.commit().await?;

        tracing::info!(
            source_type = source_type.as_str(),
            %source_id,
            description = %plan.description,
            "posted reversal group"
        );
        Ok(inserted)
    }

    /// Loads all entries for a source, in posting order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_for_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Vec<ledger_entries::Model>, PostingError> {
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::SourceType.eq(source_type.as_str()))
            .filter(ledger_entries::Column::SourceId.eq(source_id))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Lists entries for one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<ledger_entries::Model>, PostingError> {
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account.into_inner()))
            .order_by_desc(ledger_entries::Column::PostedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Derives an account balance from its entries, optionally as of a point
    /// in time. Entries posted after `as_of` are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::AccountNotFound`] if no such account exists.
    pub async fn balance_of(
        &self,
        account: AccountId,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<AccountBalance, PostingError> {
        let row = accounts::Entity::find_by_id(account.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PostingError::AccountNotFound(account.into_inner()))?;
        let account_type = parse_account_type(&row.account_type)?;

        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(row.id));
        if let Some(as_of) = as_of {
            let cutoff: chrono::DateTime<chrono::FixedOffset> = as_of.into();
            query = query.filter(ledger_entries::Column::PostedAt.lte(cutoff));
        }
        let entries = query.all(&self.db).await?;

        let mut balance = AccountBalance::new(account, account_type);
        for entry in entries {
            let (side, amount) = row_side(&entry);
            balance.accumulate(side, amount);
        }
        Ok(balance)
    }

    /// Derives the balance of every account, ordered by chart code.
    ///
    /// The sum of debit totals always equals the sum of credit totals when
    /// every posted group balanced; tests lean on that as a whole-book check.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<TrialBalanceRow>, PostingError> {
        let account_rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let mut query = ledger_entries::Entity::find();
        if let Some(as_of) = as_of {
            let cutoff: chrono::DateTime<chrono::FixedOffset> = as_of.into();
            query = query.filter(ledger_entries::Column::PostedAt.lte(cutoff));
        }
        let entries = query.all(&self.db).await?;

        let mut rows = Vec::with_capacity(account_rows.len());
        for row in account_rows {
            let account_type = parse_account_type(&row.account_type)?;
            let mut balance = AccountBalance::new(AccountId::from_uuid(row.id), account_type);
            for entry in entries.iter().filter(|e| e.account_id == row.id) {
                let (side, amount) = row_side(entry);
                balance.accumulate(side, amount);
            }
            rows.push(TrialBalanceRow {
                code: row.code,
                name: row.name,
                balance,
            });
        }
        Ok(rows)
    }

    /// Fails with the first line whose account is missing from the chart.
    async fn ensure_accounts_exist(&self, lines: &[EntryInput]) -> Result<(), PostingError> {
        let mut ids: Vec<Uuid> = lines.iter().map(|l| l.account.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();

        let found = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?;

        if found.len() != ids.len() {
            for id in ids {
                if !found.iter().any(|a| a.id == id) {
                    return Err(PostingError::AccountNotFound(id));
                }
            }
        }
        Ok(())
    }
}

/// Inserts an already-validated group on any connection, including inside an
/// open transaction. Callers run [`validate_posting`] first.
pub(crate) async fn post_group<C: ConnectionTrait>(
    conn: &C,
    source_type: SourceType,
    source_id: Uuid,
    lines: &[EntryInput],
) -> Result<Vec<ledger_entries::Model>, DbErr> {
    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

    let mut inserted = Vec::with_capacity(lines.len());
    for line in lines {
        let (debit, credit) = match line.side {
            EntrySide::Debit => (line.amount, Decimal::ZERO),
            EntrySide::Credit => (Decimal::ZERO, line.amount),
        };
        let entry = ledger_entries::ActiveModel {
            id: Set(EntryId::new().into_inner()),
            account_id: Set(line.account.into_inner()),
            debit: Set(debit),
            credit: Set(credit),
            description: Set(line.description.clone()),
            source_type: Set(source_type.as_str().to_string()),
            source_id: Set(source_id),
            posted_at: Set(now),
            created_at: Set(now),
        };
        let entry = entry.insert(conn).await?;
        inserted.push(entry);
    }
    Ok(inserted)
}

/// Rebuilds posting inputs from stored rows, preserving order.
pub(crate) fn rows_to_inputs(rows: &[ledger_entries::Model]) -> Vec<EntryInput> {
    rows.iter()
        .map(|row| {
            let (side, amount) = row_side(row);
            EntryInput {
                account: AccountId::from_uuid(row.account_id),
                side,
                amount,
                description: row.description.clone(),
            }
        })
        .collect()
}

/// Reads the side and amount of a stored entry. Zero-amount lines are
/// rejected at posting time, so exactly one column is non-zero.
fn row_side(row: &ledger_entries::Model) -> (EntrySide, Decimal) {
    if row.debit > Decimal::ZERO {
        (EntrySide::Debit, row.debit)
    } else {
        (EntrySide::Credit, row.credit)
    }
}

fn parse_account_type(value: &str) -> Result<AccountType, PostingError> {
    AccountType::parse(value).ok_or_else(|| PostingError::InvalidStored {
        field: "account_type",
        value: value.to_string(),
    })
}
