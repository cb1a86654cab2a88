//! Document repository: drafting, lifecycle, and atomic realization.
//!
//! Realizing a document (process or approve) applies its stock movements and
//! posts its ledger group inside one transaction, stock first. A shortfall
//! rolls the whole transaction back, so a document can never half-apply.
//! Missing well-known accounts do not block realization: the affected pair
//! is skipped with a warning while stock and status still go through.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::document::{
    Discount, DocumentKind, DocumentStatus, DocumentTotals, DocumentWorkflow, LineInput,
    PostingWarning, RealizationService, RefundStatus, compute_totals, round_money, validate_lines,
};
use stockbook_core::ledger::{LedgerError, SourceType, validate_posting};
use stockbook_shared::PolicyConfig;
use stockbook_shared::types::{DocumentId, LineId, ProductId, WarehouseId};

use crate::entities::{document_lines, documents, products, warehouses};
use crate::events::{EventSender, StockEvent};
use crate::repositories::account::well_known_map;
use crate::repositories::ledger::post_group;
use crate::repositories::stock::{self, MovementError};

/// Error types for document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document not found.
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    /// Document reference already exists.
    #[error("Document reference '{0}' already exists")]
    DuplicateReference(String),

    /// Document references a warehouse that does not exist.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Policy requires approval; the direct processing path is closed.
    #[error("Policy requires approval; submit and approve the document instead")]
    ApprovalRequired,

    /// Returns are raised against a parent document, not created directly.
    #[error("Returns must be created against a parent document")]
    ReturnWithoutParent,

    /// Returns realize through return approval, which re-checks the open
    /// quantity.
    #[error("Returns are realized through return approval")]
    ReturnApprovalOnly,

    /// A return-only operation was pointed at a sale or purchase.
    #[error("Document {0} is not a return")]
    NotAReturn(Uuid),

    /// A stored column does not parse back into its domain type.
    #[error("Stored value '{value}' is not a valid {field}")]
    InvalidStored {
        /// Column that failed to parse.
        field: &'static str,
        /// Offending stored value.
        value: String,
    },

    /// Domain rule violation (validation, workflow, returns, refunds).
    #[error(transparent)]
    Rule(#[from] stockbook_core::document::DocumentError),

    /// Ledger validation failure while posting effects.
    #[error(transparent)]
    Posting(#[from] LedgerError),

    /// Stock movement failure while applying effects.
    #[error(transparent)]
    Stock(#[from] MovementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a sale or purchase document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Sale or purchase.
    pub kind: DocumentKind,
    /// Warehouse the stock effects target.
    pub warehouse_id: WarehouseId,
    /// Document number; generated from the kind when omitted.
    pub reference: Option<String>,
    /// Customer or supplier name.
    pub counterparty: Option<String>,
    /// Lines, at least one.
    pub lines: Vec<LineInput>,
    /// Discount applied before the total.
    pub discount: Discount,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating a document that is still editable.
///
/// `None` fields are left untouched. When lines change without a new
/// discount, the stored discount amount is re-applied as a flat discount.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// Replacement lines.
    pub lines: Option<Vec<LineInput>>,
    /// New counterparty name.
    pub counterparty: Option<String>,
    /// New discount.
    pub discount: Option<Discount>,
    /// New notes.
    pub notes: Option<String>,
}

/// A document header together with its lines.
#[derive(Debug, Clone)]
pub struct DocumentWithLines {
    /// The header row.
    pub document: documents::Model,
    /// Its lines in entry order.
    pub lines: Vec<document_lines::Model>,
}

/// Document repository for lifecycle and realization operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
    policy: PolicyConfig,
    events: Option<EventSender>,
}

impl DocumentRepository {
    /// Creates a new document repository with the given policy.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: PolicyConfig) -> Self {
        Self {
            db,
            policy,
            events: None,
        }
    }

    /// Attaches an event sender; realized documents are announced on it.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Creates a document in `draft`, or directly in `pending` when the
    /// approval policy is on.
    ///
    /// The policy tax rate is captured on the row, so later policy changes
    /// never reprice this document.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad lines, a reference-integrity
    /// error for unknown products or warehouses, and
    /// [`DocumentError::DuplicateReference`] when the reference is taken.
    pub async fn create_document(
        &self,
        input: CreateDocumentInput,
    ) -> Result<DocumentWithLines, DocumentError> {
        if input.kind.is_return() {
            return Err(DocumentError::ReturnWithoutParent);
        }
        validate_lines(&input.lines)?;
        ensure_warehouse_exists(&self.db, input.warehouse_id.into_inner()).await?;
        ensure_products_exist(&self.db, &input.lines).await?;

        let totals = compute_totals(&input.lines, self.policy.tax_rate, input.discount)?;

        let id = DocumentId::new();
        let reference = match input.reference {
            Some(reference) => reference,
            None => generate_reference(input.kind, id),
        };
        let existing = documents::Entity::find()
            .filter(documents::Column::Reference.eq(&reference))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DocumentError::DuplicateReference(reference));
        }

        let status = if self.policy.require_approval {
            DocumentStatus::Pending
        } else {
            DocumentStatus::Draft
        };

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await?;

        let header = documents::ActiveModel {
            id: Set(id.into_inner()),
            kind: Set(input.kind.as_str().to_string()),
            status: Set(status.as_str().to_string()),
            reference: Set(reference),
            warehouse_id: Set(input.warehouse_id.into_inner()),
            counterparty: Set(input.counterparty),
            tax_rate: Set(self.policy.tax_rate),
            subtotal: Set(totals.subtotal),
            tax_amount: Set(totals.tax_amount),
            discount_amount: Set(totals.discount_amount),
            total: Set(totals.total),
            paid_amount: Set(Decimal::ZERO),
            notes: Set(input.notes),
            parent_id: Set(None),
            return_reason: Set(None),
            refund_status: Set(None),
            refund_method: Set(None),
            refund_amount: Set(None),
            refunded_at: Set(None),
            realized_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let document = header.insert(&txn).await?;
        let lines = insert_lines(&txn, document.id, &input.lines).await?;

        txn.commit().await?;

        tracing::info!(
            reference = %document.reference,
            kind = %document.kind,
            status = %document.status,
            total = %document.total,
            "created document"
        );
        Ok(DocumentWithLines { document, lines })
    }

    /// Updates a document that is still editable.
    ///
    /// Replacing lines recomputes the totals with the tax rate captured at
    /// creation, not the current policy rate.
    ///
    /// # Errors
    ///
    /// Returns [`stockbook_core::document::DocumentError::NotEditable`] once
    /// the document is realized or cancelled.
    pub async fn update_document(
        &self,
        id: DocumentId,
        input: UpdateDocumentInput,
    ) -> Result<DocumentWithLines, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let kind = parse_kind(&document.kind)?;
        if kind.is_return() {
            return Err(DocumentError::ReturnWithoutParent);
        }
        let status = parse_status(&document.status)?;
        DocumentWorkflow::ensure_editable(status)?;

        let txn = self.db.begin().await?;
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        let mut active: documents::ActiveModel = document.clone().into();

        if let Some(lines) = &input.lines {
            validate_lines(lines)?;
            ensure_products_exist(&txn, lines).await?;

            let discount = input
                .discount
                .unwrap_or(Discount::Flat(document.discount_amount));
            let totals = compute_totals(lines, document.tax_rate, discount)?;

            document_lines::Entity::delete_many()
                .filter(document_lines::Column::DocumentId.eq(document.id))
                .exec(&txn)
                .await?;
            insert_lines(&txn, document.id, lines).await?;

            active.subtotal = Set(totals.subtotal);
            active.tax_amount = Set(totals.tax_amount);
            active.discount_amount = Set(totals.discount_amount);
            active.total = Set(totals.total);
        } else if let Some(discount) = input.discount {
            let lines = load_lines(&txn, document.id).await?;
            let line_inputs: Vec<LineInput> = lines.iter().map(row_to_line_input).collect();
            let totals = compute_totals(&line_inputs, document.tax_rate, discount)?;
            active.subtotal = Set(totals.subtotal);
            active.tax_amount = Set(totals.tax_amount);
            active.discount_amount = Set(totals.discount_amount);
            active.total = Set(totals.total);
        }

        if let Some(counterparty) = input.counterparty {
            active.counterparty = Set(Some(counterparty));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(now);

        let document = active.update(&txn).await?;
        let lines = load_lines(&txn, document.id).await?;
        txn.commit().await?;

        Ok(DocumentWithLines { document, lines })
    }

    /// Deletes a document that has not been realized.
    ///
    /// Realized and cancelled documents stay on record; corrections go
    /// through returns or reversing entries instead.
    ///
    /// # Errors
    ///
    /// Returns [`stockbook_core::document::DocumentError::NotDeletable`]
    /// once the document is realized or cancelled.
    pub async fn delete_document(&self, id: DocumentId) -> Result<(), DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let status = parse_status(&document.status)?;
        DocumentWorkflow::ensure_deletable(status)?;

        let txn = self.db.begin().await?;
        document_lines::Entity::delete_many()
            .filter(document_lines::Column::DocumentId.eq(document.id))
            .exec(&txn)
            .await?;
        documents::Entity::delete_by_id(document.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(reference = %document.reference, "deleted document");
        Ok(())
    }

    /// Submits a draft for approval.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error unless the document is a draft.
    pub async fn submit(&self, id: DocumentId) -> Result<documents::Model, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let status = parse_status(&document.status)?;
        let next = DocumentWorkflow::submit(status)?;
        self.set_status(document, next, false).await
    }

    /// Cancels a document that has not been realized.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error once effects have been applied.
    pub async fn cancel(&self, id: DocumentId) -> Result<documents::Model, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let status = parse_status(&document.status)?;
        let next = DocumentWorkflow::cancel(status)?;
        self.set_status(document, next, true).await
    }

    /// Processes a draft straight to completion, applying its effects.
    ///
    /// Stock moves first, then the ledger group posts, then the status
    /// flips; all inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ApprovalRequired`] when policy demands the
    /// approval path, and an insufficient-stock error (rolling everything
    /// back) when an outbound line cannot be covered.
    pub async fn process(&self, id: DocumentId) -> Result<DocumentWithLines, DocumentError> {
        if self.policy.require_approval {
            return Err(DocumentError::ApprovalRequired);
        }
        let document = load_document(&self.db, id.into_inner()).await?;
        let kind = parse_kind(&document.kind)?;
        if kind.is_return() {
            return Err(DocumentError::ReturnApprovalOnly);
        }
        let status = parse_status(&document.status)?;
        let next = DocumentWorkflow::process(status)?;

        let txn = self.db.begin().await?;
        let (document, warnings) = realize_in(&txn, &document, next).await?;
        txn.commit().await?;

        log_warnings(&document, &warnings);
        emit_realized(self.events.as_ref(), &document, kind);

        let lines = load_lines(&self.db, document.id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    /// Approves a pending document, applying its effects.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error unless the document is pending,
    /// and an insufficient-stock error when an outbound line cannot be
    /// covered.
    pub async fn approve(&self, id: DocumentId) -> Result<DocumentWithLines, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let kind = parse_kind(&document.kind)?;
        if kind.is_return() {
            return Err(DocumentError::ReturnApprovalOnly);
        }
        let status = parse_status(&document.status)?;
        let next = DocumentWorkflow::approve(status)?;

        let txn = self.db.begin().await?;
        let (document, warnings) = realize_in(&txn, &document, next).await?;
        txn.commit().await?;

        log_warnings(&document, &warnings);
        emit_realized(self.events.as_ref(), &document, kind);

        let lines = load_lines(&self.db, document.id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    /// Finds a document by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if no such document exists.
    pub async fn find_by_id(&self, id: DocumentId) -> Result<documents::Model, DocumentError> {
        load_document(&self.db, id.into_inner()).await
    }

    /// Finds a document with its lines.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if no such document exists.
    pub async fn find_with_lines(
        &self,
        id: DocumentId,
    ) -> Result<DocumentWithLines, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let lines = load_lines(&self.db, document.id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    /// Finds a document by its reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<documents::Model>, DocumentError> {
        let document = documents::Entity::find()
            .filter(documents::Column::Reference.eq(reference))
            .one(&self.db)
            .await?;
        Ok(document)
    }

    /// Lists documents, newest first, optionally filtered by kind and
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        kind: Option<DocumentKind>,
        status: Option<DocumentStatus>,
    ) -> Result<Vec<documents::Model>, DocumentError> {
        let mut query = documents::Entity::find()
            .order_by_desc(documents::Column::CreatedAt)
            .order_by_desc(documents::Column::Id);
        if let Some(kind) = kind {
            query = query.filter(documents::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = status {
            query = query.filter(documents::Column::Status.eq(status.as_str()));
        }
        let rows = query.all(&self.db).await?;
        Ok(rows)
    }

    async fn set_status(
        &self,
        document: documents::Model,
        next: DocumentStatus,
        cancelled: bool,
    ) -> Result<documents::Model, DocumentError> {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let reference = document.reference.clone();

        let mut active: documents::ActiveModel = document.into();
        active.status = Set(next.as_str().to_string());
        if cancelled {
            active.cancelled_at = Set(Some(now));
        }
        active.updated_at = Set(now);
        let document = active.update(&self.db).await?;

        tracing::info!(%reference, status = %next, "document status changed");
        Ok(document)
    }
}

/// Applies a document's effects and flips its status, all on the given
/// transaction. Stock moves before the ledger posts; the caller commits.
pub(crate) async fn realize_in(
    txn: &DatabaseTransaction,
    document: &documents::Model,
    next_status: DocumentStatus,
) -> Result<(documents::Model, Vec<PostingWarning>), DocumentError> {
    let kind = parse_kind(&document.kind)?;
    let lines = load_lines(txn, document.id).await?;
    let line_inputs: Vec<LineInput> = lines.iter().map(row_to_line_input).collect();

    let costs = load_costs(txn, &lines).await?;
    let chart = well_known_map(txn).await?;
    let totals = DocumentTotals {
        subtotal: document.subtotal,
        tax_amount: document.tax_amount,
        discount_amount: document.discount_amount,
        total: document.total,
    };

    let plan = RealizationService::plan_document(
        kind,
        WarehouseId::from_uuid(document.warehouse_id),
        &line_inputs,
        &totals,
        &document.reference,
        |product| costs.get(&product).copied(),
        |account| chart.get(&account).copied(),
    )?;

    // Stock first: a shortfall aborts before anything hits the ledger.
    for movement in &plan.movements {
        stock::apply_movement_in(txn, movement).await?;
    }

    if plan.has_postings() {
        let entry_lines = plan.entry_lines();
        validate_posting(&entry_lines)?;
        post_group(txn, SourceType::Document, document.id, &entry_lines).await?;
    }

    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
    let mut active: documents::ActiveModel = document.clone().into();
    active.status = Set(next_status.as_str().to_string());
    active.realized_at = Set(Some(now));
    active.updated_at = Set(now);
    let document = active.update(txn).await?;

    Ok((document, plan.warnings))
}

/// Announces a realized document on the event channel, if one is attached.
pub(crate) fn emit_realized(
    events: Option<&EventSender>,
    document: &documents::Model,
    kind: DocumentKind,
) {
    if let Some(events) = events {
        events.send(StockEvent::DocumentRealized {
            document: DocumentId::from_uuid(document.id),
            kind,
            reference: document.reference.clone(),
        });
    }
}

/// Logs each posting the realization had to skip.
pub(crate) fn log_warnings(document: &documents::Model, warnings: &[PostingWarning]) {
    for warning in warnings {
        tracing::warn!(reference = %document.reference, %warning, "ledger posting skipped");
    }
}

pub(crate) async fn load_document<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<documents::Model, DocumentError> {
    documents::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(DocumentError::NotFound(id))
}

pub(crate) async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
) -> Result<Vec<document_lines::Model>, DbErr> {
    document_lines::Entity::find()
        .filter(document_lines::Column::DocumentId.eq(document_id))
        .order_by_asc(document_lines::Column::Id)
        .all(conn)
        .await
}

pub(crate) async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
    lines: &[LineInput],
) -> Result<Vec<document_lines::Model>, DbErr> {
    let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
    let mut inserted = Vec::with_capacity(lines.len());
    for line in lines {
        let row = document_lines::ActiveModel {
            id: Set(LineId::new().into_inner()),
            document_id: Set(document_id),
            product_id: Set(line.product.into_inner()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            line_total: Set(round_money(line.line_total())),
            batch: Set(line.batch.clone()),
            expiry_date: Set(line.expiry_date),
            created_at: Set(now),
        };
        inserted.push(row.insert(conn).await?);
    }
    Ok(inserted)
}

/// Loads cost prices for every product on the given lines.
pub(crate) async fn load_costs<C: ConnectionTrait>(
    conn: &C,
    lines: &[document_lines::Model],
) -> Result<HashMap<ProductId, Decimal>, DbErr> {
    let mut ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = products::Entity::find()
        .filter(products::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|p| (ProductId::from_uuid(p.id), p.cost_price))
        .collect())
}

/// Fails with the first line whose product is missing from the catalog.
pub(crate) async fn ensure_products_exist<C: ConnectionTrait>(
    conn: &C,
    lines: &[LineInput],
) -> Result<(), DocumentError> {
    let mut ids: Vec<Uuid> = lines.iter().map(|l| l.product.into_inner()).collect();
    ids.sort_unstable();
    ids.dedup();

    let found = products::Entity::find()
        .filter(products::Column::Id.is_in(ids.clone()))
        .all(conn)
        .await?;

    if found.len() != ids.len() {
        for id in ids {
            if !found.iter().any(|p| p.id == id) {
                return Err(stockbook_core::document::DocumentError::UnknownProduct(
                    ProductId::from_uuid(id),
                )
                .into());
            }
        }
    }
    Ok(())
}

pub(crate) async fn ensure_warehouse_exists<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<(), DocumentError> {
    warehouses::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(DocumentError::WarehouseNotFound(id))
}

pub(crate) fn parse_kind(value: &str) -> Result<DocumentKind, DocumentError> {
    DocumentKind::parse(value).ok_or_else(|| DocumentError::InvalidStored {
        field: "kind",
        value: value.to_string(),
    })
}

pub(crate) fn parse_status(value: &str) -> Result<DocumentStatus, DocumentError> {
    DocumentStatus::parse(value).ok_or_else(|| DocumentError::InvalidStored {
        field: "status",
        value: value.to_string(),
    })
}

pub(crate) fn parse_refund_status(value: Option<&str>) -> Result<RefundStatus, DocumentError> {
    match value {
        None => Ok(RefundStatus::None),
        Some(value) => RefundStatus::parse(value).ok_or_else(|| DocumentError::InvalidStored {
            field: "refund_status",
            value: value.to_string(),
        }),
    }
}

pub(crate) fn row_to_line_input(row: &document_lines::Model) -> LineInput {
    LineInput {
        product: ProductId::from_uuid(row.product_id),
        quantity: row.quantity,
        unit_price: row.unit_price,
        batch: row.batch.clone(),
        expiry_date: row.expiry_date,
    }
}

/// Builds a reference from the kind prefix and the document id.
pub(crate) fn generate_reference(kind: DocumentKind, id: DocumentId) -> String {
    let prefix = match kind {
        DocumentKind::Sale => "SO",
        DocumentKind::Purchase => "PO",
        DocumentKind::SaleReturn => "SR",
        DocumentKind::PurchaseReturn => "PR",
    };
    let hex = id.into_inner().simple().to_string();
    format!("{prefix}-{}", hex[..8].to_uppercase())
}
