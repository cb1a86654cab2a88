//! Account repository for chart of accounts database operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use stockbook_core::ledger::{AccountType, WellKnownAccount};
use stockbook_shared::types::AccountId;

use crate::entities::{accounts, ledger_entries};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Parent account given at creation does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Cannot delete an account that has child accounts.
    #[error("Cannot delete account: account has {0} child accounts")]
    HasChildren(u64),

    /// Cannot delete an account that has ledger entries.
    #[error("Cannot delete account: account has {0} ledger entries")]
    HasEntries(u64),

    /// A stored column does not parse back into its domain type.
    #[error("Stored value '{value}' is not a valid {field}")]
    InvalidStored {
        /// Column that failed to parse.
        field: &'static str,
        /// Offending stored value.
        value: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Chart code, unique.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Parent account for chart grouping, if any.
    pub parent: Option<AccountId>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a unique code, optionally nested under a
    /// parent account.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is already taken, the parent does not
    /// exist, or the database operation fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        if let Some(parent) = input.parent {
            let found = accounts::Entity::find_by_id(parent.into_inner())
                .one(&self.db)
                .await?;
            if found.is_none() {
                return Err(AccountError::ParentNotFound(parent.into_inner()));
            }
        }

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.as_str().to_string()),
            parent_id: Set(input.parent.map(AccountId::into_inner)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Finds an account by its chart code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<accounts::Model>, AccountError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(account)
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if no such account exists.
    pub async fn find_by_id(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id.into_inner()))
    }

    /// Lists all accounts ordered by chart code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Renames an account.
    ///
    /// The code and type are immutable once entries may reference the
    /// account; only the display name can change.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if no such account exists.
    pub async fn rename_account(
        &self,
        id: AccountId,
        name: String,
    ) -> Result<accounts::Model, AccountError> {
        let account = self.find_by_id(id).await?;

        let mut active: accounts::ActiveModel = account.into();
        active.name = Set(name);
        active.updated_at = Set(chrono::Utc::now().into());

        let account = active.update(&self.db).await?;
        Ok(account)
    }

    /// Lists the direct children of an account, ordered by chart code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn children_of(&self, id: AccountId) -> Result<Vec<accounts::Model>, AccountError> {
        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(children)
    }

    /// Deletes a leaf account that has never been posted to.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::HasChildren`] when other accounts nest under
    /// this one, and [`AccountError::HasEntries`] when ledger entries
    /// reference it; posted history is never orphaned.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        let account = self.find_by_id(id).await?;

        let child_count = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account.id))
            .count(&self.db)
            .await?;

        if child_count > 0 {
            return Err(AccountError::HasChildren(child_count));
        }

        let entry_count = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account.id))
            .count(&self.db)
            .await?;

        if entry_count > 0 {
            return Err(AccountError::HasEntries(entry_count));
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Resolves the well-known chart, mapping each role to the id of the
    /// account carrying its code. Missing accounts are simply absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn well_known(&self) -> Result<HashMap<WellKnownAccount, AccountId>, AccountError> {
        let map = well_known_map(&self.db).await?;
        Ok(map)
    }
}

/// Parses the stored account type string.
pub(crate) fn parse_account_type(value: &str) -> Result<AccountType, AccountError> {
    AccountType::parse(value).ok_or_else(|| AccountError::InvalidStored {
        field: "account_type",
        value: value.to_string(),
    })
}

/// Loads the well-known chart mapping on any connection, including inside
/// an open transaction.
pub(crate) async fn well_known_map<C: ConnectionTrait>(
    conn: &C,
) -> Result<HashMap<WellKnownAccount, AccountId>, DbErr> {
    let codes: Vec<String> = WellKnownAccount::ALL
        .iter()
        .map(|account| account.code().to_string())
        .collect();

    let rows = accounts::Entity::find()
        .filter(accounts::Column::Code.is_in(codes))
        .filter(accounts::Column::IsActive.eq(true))
        .all(conn)
        .await?;

    let mut map = HashMap::new();
    for row in rows {
        if let Some(role) = WellKnownAccount::ALL
            .into_iter()
            .find(|account| account.code() == row.code)
        {
            map.insert(role, AccountId::from_uuid(row.id));
        }
    }
    Ok(map)
}
