//! Return repository: raising returns against realized documents and paying
//! out refunds.
//!
//! A return is a document of the inverse kind, priced from its parent. The
//! open quantity per product (parent quantity minus earlier non-cancelled
//! returns) caps what a return may take back, checked when the return is
//! created and again when it is approved. Refunds settle at most once: the
//! status flip is a guarded update, so a concurrent retry loses and is told
//! the refund was already processed.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::document::{
    Discount, DocumentKind, DocumentStatus, DocumentWorkflow, LineInput, RealizationService,
    RefundStatus, compute_totals, round_money, validate_reason, validate_refund_request,
    validate_return_lines,
};
use stockbook_core::ledger::{PaymentMethod, SourceType, validate_posting};
use stockbook_shared::types::{DocumentId, ProductId};

use crate::entities::{document_lines, documents};
use crate::events::{EventSender, StockEvent};
use crate::repositories::account::well_known_map;
use crate::repositories::document::{
    DocumentError, DocumentWithLines, emit_realized, generate_reference, insert_lines,
    load_document, load_lines, log_warnings, parse_kind, parse_refund_status, parse_status,
    realize_in, row_to_line_input,
};
use crate::repositories::ledger::post_group;

/// One line of a return as supplied by the caller.
///
/// Unit prices are not caller-settable: returns are always priced from the
/// parent document.
#[derive(Debug, Clone)]
pub struct ReturnLineInput {
    /// Product coming back.
    pub product: ProductId,
    /// Quantity to return. Must be positive.
    pub quantity: Decimal,
    /// Batch bucket the goods move through.
    pub batch: Option<String>,
}

/// Input for raising a return against a realized document.
#[derive(Debug, Clone)]
pub struct CreateReturnInput {
    /// The realized sale or purchase being returned against.
    pub parent_id: DocumentId,
    /// Products and quantities coming back.
    pub lines: Vec<ReturnLineInput>,
    /// Why the goods are coming back. Required.
    pub reason: String,
    /// Document number; generated when omitted.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Return repository for raising, approving, and refunding returns.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    db: DatabaseConnection,
    events: Option<EventSender>,
}

impl ReturnRepository {
    /// Creates a new return repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, events: None }
    }

    /// Attaches an event sender; approvals and refunds are announced on it.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Raises a draft return against a realized sale or purchase.
    ///
    /// Lines are priced at the parent's unit prices (quantity-weighted when
    /// the parent had several lines of the product), the parent's captured
    /// tax rate applies, and no discount is carried. Quantities are capped
    /// at what the parent still has open; draft and pending returns count
    /// against the cap so two open returns cannot claim the same units.
    ///
    /// # Errors
    ///
    /// Returns a rule error when the parent is not realized, the reason is
    /// blank, or a quantity exceeds the open amount.
    pub async fn create_return(
        &self,
        input: CreateReturnInput,
    ) -> Result<DocumentWithLines, DocumentError> {
        let parent = load_document(&self.db, input.parent_id.into_inner()).await?;
        let parent_kind = parse_kind(&parent.kind)?;
        let return_kind = parent_kind.return_kind().ok_or(
            stockbook_core::document::DocumentError::NotReturnable { kind: parent_kind },
        )?;
        let parent_status = parse_status(&parent.status)?;
        if !parent_status.is_realized() {
            return Err(stockbook_core::document::DocumentError::ParentNotRealized {
                status: parent_status,
            }
            .into());
        }
        validate_reason(&input.reason)?;

        let pricing = parent_pricing(&self.db, &parent).await?;
        let returnable = open_quantities(&self.db, &parent, return_kind, None).await?;

        let line_inputs: Vec<LineInput> = input
            .lines
            .iter()
            .map(|line| {
                let unit_price = pricing
                    .get(&line.product)
                    .map_or(Decimal::ZERO, |p| p.unit_price());
                let mut built = LineInput::new(line.product, line.quantity, unit_price);
                if let Some(batch) = &line.batch {
                    built = built.with_batch(batch.clone());
                }
                built
            })
            .collect();

        validate_return_lines(&line_inputs, &returnable)?;
        let totals = compute_totals(&line_inputs, parent.tax_rate, Discount::None)?;

        let id = DocumentId::new();
        let reference = match input.reference {
            Some(reference) => reference,
            None => generate_reference(return_kind, id),
        };
        let existing = documents::Entity::find()
            .filter(documents::Column::Reference.eq(&reference))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DocumentError::DuplicateReference(reference));
        }

        // Sale returns track a refund; purchase returns settle against the
        // supplier balance instead.
        let refund_status = match return_kind {
            DocumentKind::SaleReturn => Some(RefundStatus::None.as_str().to_string()),
            _ => None,
        };

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await?;

        let header = documents::ActiveModel {
            id: Set(id.into_inner()),
            kind: Set(return_kind.as_str().to_string()),
            status: Set(DocumentStatus::Draft.as_str().to_string()),
            reference: Set(reference),
            warehouse_id: Set(parent.warehouse_id),
            counterparty: Set(parent.counterparty.clone()),
            tax_rate: Set(parent.tax_rate),
            subtotal: Set(totals.subtotal),
            tax_amount: Set(totals.tax_amount),
            discount_amount: Set(totals.discount_amount),
            total: Set(totals.total),
            paid_amount: Set(Decimal::ZERO),
            notes: Set(input.notes),
            parent_id: Set(Some(parent.id)),
            return_reason: Set(Some(input.reason.trim().to_string())),
            refund_status: Set(refund_status),
            refund_method: Set(None),
            refund_amount: Set(None),
            refunded_at: Set(None),
            realized_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let document = header.insert(&txn).await?;
        let lines = insert_lines(&txn, document.id, &line_inputs).await?;

        txn.commit().await?;

        tracing::info!(
            reference = %document.reference,
            parent = %parent.reference,
            total = %document.total,
            "created return"
        );
        Ok(DocumentWithLines { document, lines })
    }

    /// Approves a return, applying its inverse effects.
    ///
    /// Sale returns take the goods back in and post sales returns against
    /// the receivable; purchase returns issue the goods out and post the
    /// payable against inventory. The open quantity is re-checked first, so
    /// a return that was overtaken by another one since creation is
    /// refused instead of over-drawing the parent.
    ///
    /// # Errors
    ///
    /// Returns an invalid-transition error once the return is realized or
    /// cancelled, and an over-return error when the open quantity no longer
    /// covers it.
    pub async fn approve_return(&self, id: DocumentId) -> Result<DocumentWithLines, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let kind = parse_kind(&document.kind)?;
        if !kind.is_return() {
            return Err(DocumentError::NotAReturn(document.id));
        }
        let status = parse_status(&document.status)?;
        let next = DocumentWorkflow::approve_return(status)?;

        let parent_id = document.parent_id.ok_or(DocumentError::NotAReturn(document.id))?;
        let parent = load_document(&self.db, parent_id).await?;

        let returnable = open_quantities(&self.db, &parent, kind, Some(document.id)).await?;
        let lines = load_lines(&self.db, document.id).await?;
        let line_inputs: Vec<LineInput> = lines.iter().map(row_to_line_input).collect();
        validate_return_lines(&line_inputs, &returnable)?;

        let txn = self.db.begin().await?;
        let (document, warnings) = realize_in(&txn, &document, next).await?;
        txn.commit().await?;

        log_warnings(&document, &warnings);
        emit_realized(self.events.as_ref(), &document, kind);

        let lines = load_lines(&self.db, document.id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    /// Pays out the refund on an approved sale return, at most once.
    ///
    /// The refund state flips through a guarded update keyed on the
    /// not-yet-refunded state; whoever loses that race gets
    /// [`stockbook_core::document::DocumentError::RefundAlreadyProcessed`].
    /// The payout posting (receivable against the money account of the
    /// chosen method) lands in the same transaction as the flip.
    ///
    /// # Errors
    ///
    /// Returns a rule error when the document is not an approved sale
    /// return, the amount is out of range, or the refund was already paid.
    pub async fn process_refund(
        &self,
        id: DocumentId,
        method: PaymentMethod,
        amount: Decimal,
    ) -> Result<documents::Model, DocumentError> {
        let document = load_document(&self.db, id.into_inner()).await?;
        let kind = parse_kind(&document.kind)?;
        let status = parse_status(&document.status)?;
        let refund_status = parse_refund_status(document.refund_status.as_deref())?;

        validate_refund_request(kind, status, refund_status, amount, document.total)?;

        let amount = round_money(amount);
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await?;

        // Guarded flip: only one refund can ever observe the open state.
        let flip = documents::Entity::update_many()
            .col_expr(
                documents::Column::RefundStatus,
                Expr::value(RefundStatus::Completed.as_str()),
            )
            .col_expr(documents::Column::RefundMethod, Expr::value(method.as_str()))
            .col_expr(documents::Column::RefundAmount, Expr::value(amount))
            .col_expr(documents::Column::RefundedAt, Expr::value(now))
            .col_expr(documents::Column::UpdatedAt, Expr::value(now))
            .filter(documents::Column::Id.eq(document.id))
            .filter(documents::Column::RefundStatus.eq(RefundStatus::None.as_str()))
            .exec(&txn)
            .await?;
        if flip.rows_affected == 0 {
            return Err(stockbook_core::document::DocumentError::RefundAlreadyProcessed.into());
        }

        let chart = well_known_map(&txn).await?;
        let plan = RealizationService::plan_refund(method, amount, &document.reference, |account| {
            chart.get(&account).copied()
        });
        if plan.has_postings() {
            let entry_lines = plan.entry_lines();
            validate_posting(&entry_lines)?;
            post_group(&txn, SourceType::Refund, document.id, &entry_lines).await?;
        }

        txn.commit().await?;

        log_warnings(&document, &plan.warnings);
        if let Some(events) = &self.events {
            events.send(StockEvent::RefundProcessed {
                document: DocumentId::from_uuid(document.id),
                amount,
            });
        }
        tracing::info!(
            reference = %document.reference,
            %amount,
            method = method.as_str(),
            "processed refund"
        );

        load_document(&self.db, document.id).await
    }

    /// Lists the returns raised against a document, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn returns_of(
        &self,
        parent_id: DocumentId,
    ) -> Result<Vec<documents::Model>, DocumentError> {
        let rows = documents::Entity::find()
            .filter(documents::Column::ParentId.eq(parent_id.into_inner()))
            .order_by_asc(documents::Column::CreatedAt)
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

/// Quantity and value of one product across the parent's lines.
struct ParentPricing {
    quantity: Decimal,
    value: Decimal,
}

impl ParentPricing {
    /// Quantity-weighted unit price.
    fn unit_price(&self) -> Decimal {
        if self.quantity == Decimal::ZERO {
            Decimal::ZERO
        } else {
            self.value / self.quantity
        }
    }
}

/// Sums quantity and value per product on the parent document.
async fn parent_pricing<C: ConnectionTrait>(
    conn: &C,
    parent: &documents::Model,
) -> Result<HashMap<ProductId, ParentPricing>, DocumentError> {
    let lines = load_lines(conn, parent.id).await?;
    let mut pricing: HashMap<ProductId, ParentPricing> = HashMap::new();
    for line in lines {
        let entry = pricing
            .entry(ProductId::from_uuid(line.product_id))
            .or_insert(ParentPricing {
                quantity: Decimal::ZERO,
                value: Decimal::ZERO,
            });
        entry.quantity += line.quantity;
        entry.value += line.quantity * line.unit_price;
    }
    Ok(pricing)
}

/// Computes the quantity per product the parent still has open: its own
/// quantities minus every non-cancelled return except `exclude`.
async fn open_quantities<C: ConnectionTrait>(
    conn: &C,
    parent: &documents::Model,
    return_kind: DocumentKind,
    exclude: Option<Uuid>,
) -> Result<HashMap<ProductId, Decimal>, DocumentError> {
    let mut open: HashMap<ProductId, Decimal> = HashMap::new();
    for line in load_lines(conn, parent.id).await? {
        *open
            .entry(ProductId::from_uuid(line.product_id))
            .or_insert(Decimal::ZERO) += line.quantity;
    }

    let mut children = documents::Entity::find()
        .filter(documents::Column::ParentId.eq(parent.id))
        .filter(documents::Column::Kind.eq(return_kind.as_str()))
        .filter(documents::Column::Status.ne(DocumentStatus::Cancelled.as_str()));
    if let Some(exclude) = exclude {
        children = children.filter(documents::Column::Id.ne(exclude));
    }
    let child_ids: Vec<Uuid> = children.all(conn).await?.into_iter().map(|d| d.id).collect();

    if !child_ids.is_empty() {
        let taken = document_lines::Entity::find()
            .filter(document_lines::Column::DocumentId.is_in(child_ids))
            .all(conn)
            .await?;
        for line in taken {
            *open
                .entry(ProductId::from_uuid(line.product_id))
                .or_insert(Decimal::ZERO) -= line.quantity;
        }
    }

    Ok(open)
}
