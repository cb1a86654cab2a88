//! Business rule validation for documents, returns and refunds.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stockbook_shared::types::ProductId;

use super::error::DocumentError;
use super::types::{DocumentKind, DocumentStatus, LineInput, RefundStatus};

/// Validates the lines of a document before it is created or updated.
///
/// Requires at least one line, positive quantities and non-negative unit
/// prices.
///
/// # Errors
///
/// Returns the first violated rule together with the offending line index.
pub fn validate_lines(lines: &[LineInput]) -> Result<(), DocumentError> {
    if lines.is_empty() {
        return Err(DocumentError::EmptyLines);
    }

    for (index, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            return Err(DocumentError::NonPositiveQuantity { line: index });
        }
        if line.unit_price < Decimal::ZERO {
            return Err(DocumentError::NegativeUnitPrice { line: index });
        }
    }

    Ok(())
}

/// Validates the free-text reason attached to a return.
///
/// # Errors
///
/// Returns [`DocumentError::ReasonRequired`] when the reason is empty or
/// whitespace only.
pub fn validate_reason(reason: &str) -> Result<(), DocumentError> {
    if reason.trim().is_empty() {
        return Err(DocumentError::ReasonRequired);
    }
    Ok(())
}

/// Validates a return's lines against what the parent still allows.
///
/// `returnable` maps each product on the parent to the quantity that is
/// still open: the realized quantity minus what earlier returns already took
/// back. Requested quantities are summed per product across lines, so two
/// lines of the same product cannot slip past the cap.
///
/// # Errors
///
/// Returns [`DocumentError::OverReturn`] for the first product whose
/// requested quantity exceeds its open quantity. Products absent from the
/// parent have an open quantity of zero.
pub fn validate_return_lines(
    lines: &[LineInput],
    returnable: &HashMap<ProductId, Decimal>,
) -> Result<(), DocumentError> {
    validate_lines(lines)?;

    let mut requested: HashMap<ProductId, Decimal> = HashMap::new();
    for line in lines {
        *requested.entry(line.product).or_insert(Decimal::ZERO) += line.quantity;
    }

    for (product, quantity) in requested {
        let open = returnable.get(&product).copied().unwrap_or(Decimal::ZERO);
        if quantity > open {
            return Err(DocumentError::OverReturn {
                product,
                requested: quantity,
                returnable: open,
            });
        }
    }

    Ok(())
}

/// Validates a refund request against the return it targets.
///
/// The checks run in order: the document must be a sale return, the return
/// must be approved, no refund may have been paid yet, and the amount must be
/// positive and within `refundable`.
///
/// # Errors
///
/// Returns the first violated rule. [`DocumentError::RefundAlreadyProcessed`]
/// makes the operation idempotent-safe: a retry after success is refused
/// rather than paid twice.
pub fn validate_refund_request(
    kind: DocumentKind,
    status: DocumentStatus,
    refund_status: RefundStatus,
    amount: Decimal,
    refundable: Decimal,
) -> Result<(), DocumentError> {
    if kind != DocumentKind::SaleReturn {
        return Err(DocumentError::RefundOnNonSaleReturn { kind });
    }
    if !status.is_realized() {
        return Err(DocumentError::RefundRequiresApproval { status });
    }
    if refund_status == RefundStatus::Completed {
        return Err(DocumentError::RefundAlreadyProcessed);
    }
    if amount <= Decimal::ZERO || amount > refundable {
        return Err(DocumentError::RefundAmountOutOfRange {
            requested: amount,
            limit: refundable,
        });
    }
    Ok(())
}
