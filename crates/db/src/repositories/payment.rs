//! Payment repository: money movements outside the document flow.
//!
//! Each payment stores one row and posts exactly one balanced pair in the
//! same transaction. Customer receipts additionally bump the paid amount of
//! the sale they settle, capped at its total. Unlike document realization,
//! a payment's posting is its only effect, so a missing well-known account
//! fails the payment instead of degrading it.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use stockbook_core::ledger::{LedgerError, PaymentMethod, SourceType, validate_posting};
use stockbook_core::payment::{PaymentKind, PaymentService};
use stockbook_shared::types::{AccountId, DocumentId, PaymentId};

use crate::entities::{accounts, documents, payments};
use crate::repositories::account::well_known_map;
use crate::repositories::ledger::post_group;

// ========== Errors ==========

/// Errors raised by payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No payment with the given id.
    #[error("Payment {0} not found")]
    NotFound(Uuid),

    /// Payment references must be unique.
    #[error("Payment reference '{0}' already exists")]
    DuplicateReference(String),

    /// The document a payment settles must exist.
    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    /// The expense account to debit must exist.
    #[error("Account {0} not found")]
    AccountNotFound(Uuid),

    /// A payment posting rule was violated.
    #[error(transparent)]
    Rule(#[from] stockbook_core::payment::PaymentError),

    /// The planned pair failed posting validation.
    #[error(transparent)]
    Posting(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

// ========== Inputs ==========

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Business meaning of the movement.
    pub kind: PaymentKind,
    /// Whether cash or bank money moves.
    pub method: PaymentMethod,
    /// Amount of the movement. Must be positive.
    pub amount: Decimal,
    /// Payment number; generated when omitted.
    pub reference: Option<String>,
    /// Document this payment settles, when any.
    pub document_id: Option<DocumentId>,
    /// Cost account debited by expense payments.
    pub expense_account_id: Option<AccountId>,
    /// Free-form notes.
    pub notes: Option<String>,
}

// ========== Repository ==========

/// Payment repository for recording and querying payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment and posts its pair.
    ///
    /// The row, the ledger pair, and (for customer receipts against a
    /// sale) the paid-amount bump all land in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when the reference is taken, a referenced document
    /// or account is missing, or the posting rules reject the payment.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        let id = PaymentId::new();
        let reference = match input.reference {
            Some(reference) => reference,
            None => generate_reference(id),
        };
        let existing = payments::Entity::find()
            .filter(payments::Column::Reference.eq(&reference))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(PaymentError::DuplicateReference(reference));
        }

        let settled = match input.document_id {
            Some(document_id) => {
                let document = documents::Entity::find_by_id(document_id.into_inner())
                    .one(&self.db)
                    .await?
                    .ok_or(PaymentError::DocumentNotFound(document_id.into_inner()))?;
                Some(document)
            }
            None => None,
        };
        if let Some(expense) = input.expense_account_id {
            accounts::Entity::find_by_id(expense.into_inner())
                .one(&self.db)
                .await?
                .ok_or(PaymentError::AccountNotFound(expense.into_inner()))?;
        }

        let chart = well_known_map(&self.db).await?;
        let pair = PaymentService::plan(
            input.kind,
            input.method,
            input.amount,
            &reference,
            input.expense_account_id,
            |account| chart.get(&account).copied(),
        )?;
        let amount = pair.amount;
        let lines = pair.into_lines();
        validate_posting(&lines)?;

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await?;

        let payment = payments::ActiveModel {
            id: Set(id.into_inner()),
            kind: Set(input.kind.as_str().to_string()),
            method: Set(input.method.as_str().to_string()),
            amount: Set(amount),
            reference: Set(reference),
            document_id: Set(input.document_id.map(DocumentId::into_inner)),
            expense_account_id: Set(input.expense_account_id.map(AccountId::into_inner)),
            notes: Set(input.notes),
            paid_at: Set(now),
            created_at: Set(now),
        };
        let payment = payment.insert(&txn).await?;

        post_group(&txn, SourceType::Payment, payment.id, &lines).await?;

        if input.kind.settles_receivable() {
            if let Some(document) = settled {
                let paid = PaymentService::bump_paid(document.paid_amount, document.total, amount);
                let update = documents::ActiveModel {
                    id: Set(document.id),
                    paid_amount: Set(paid),
                    updated_at: Set(now),
                    ..Default::default()
                };
                update.update(&txn).await?;
            }
        }

        txn.commit().await?;

        tracing::info!(
            reference = %payment.reference,
            kind = %payment.kind,
            %amount,
            "recorded payment"
        );
        Ok(payment)
    }

    /// Finds a payment by id.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotFound`] if no payment has the id.
    pub async fn find_by_id(&self, id: PaymentId) -> Result<payments::Model, PaymentError> {
        payments::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(id.into_inner()))
    }

    /// Lists all payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payments(&self) -> Result<Vec<payments::Model>, PaymentError> {
        let rows = payments::Entity::find()
            .order_by_desc(payments::Column::PaidAt)
            .order_by_desc(payments::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Lists the payments recorded against a document, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn payments_of(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        let rows = payments::Entity::find()
            .filter(payments::Column::DocumentId.eq(document_id.into_inner()))
            .order_by_asc(payments::Column::PaidAt)
            .order_by_asc(payments::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

/// Builds a payment number from the id: `PAY-` plus its first eight hex
/// digits, uppercased.
fn generate_reference(id: PaymentId) -> String {
    let hex = id.into_inner().simple().to_string();
    format!("PAY-{}", hex[..8].to_uppercase())
}
