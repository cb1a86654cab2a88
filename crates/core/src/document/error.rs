//! Document domain errors.

use crate::document::types::{DocumentKind, DocumentStatus};
use rust_decimal::Decimal;
use stockbook_shared::types::ProductId;
use thiserror::Error;

/// Errors raised by document validation, lifecycle and realization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    // ========== Validation ==========
    /// The document has no lines.
    #[error("Document must have at least one line")]
    EmptyLines,

    /// A line quantity is zero or negative.
    #[error("Line {line} has a non-positive quantity")]
    NonPositiveQuantity {
        /// Zero-based index of the offending line.
        line: usize,
    },

    /// A line unit price is negative.
    #[error("Line {line} has a negative unit price")]
    NegativeUnitPrice {
        /// Zero-based index of the offending line.
        line: usize,
    },

    /// The discount is negative.
    #[error("Discount must not be negative")]
    NegativeDiscount,

    /// A line references a product that does not exist.
    #[error("Product {0} does not exist")]
    UnknownProduct(ProductId),

    /// A return was created without a reason.
    #[error("Return reason is required")]
    ReasonRequired,

    // ========== Workflow ==========
    /// The requested status change is not a valid lifecycle edge.
    #[error("Cannot transition document from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: DocumentStatus,
        /// Requested status.
        to: DocumentStatus,
    },

    /// The document can no longer be modified.
    #[error("Cannot modify a document in {status} status")]
    NotEditable {
        /// Current status.
        status: DocumentStatus,
    },

    /// The document can no longer be deleted.
    #[error("Cannot delete a document in {status} status")]
    NotDeletable {
        /// Current status.
        status: DocumentStatus,
    },

    // ========== Returns ==========
    /// Returns can only be raised against sales and purchases.
    #[error("Documents of kind {kind} cannot be returned")]
    NotReturnable {
        /// Kind of the parent document.
        kind: DocumentKind,
    },

    /// The parent document has not applied its effects yet.
    #[error("Cannot return against a document in {status} status")]
    ParentNotRealized {
        /// Status of the parent document.
        status: DocumentStatus,
    },

    /// A return asks for more than the parent still allows.
    #[error(
        "Return of {requested} exceeds the returnable quantity {returnable} for product {product}"
    )]
    OverReturn {
        /// Product being over-returned.
        product: ProductId,
        /// Quantity requested across the return's lines.
        requested: Decimal,
        /// Quantity still open on the parent.
        returnable: Decimal,
    },

    // ========== Refunds ==========
    /// The refund was already paid out.
    #[error("Refund has already been processed for this return")]
    RefundAlreadyProcessed,

    /// Refunds apply to sale returns only.
    #[error("Cannot refund a document of kind {kind}")]
    RefundOnNonSaleReturn {
        /// Kind of the document the refund targeted.
        kind: DocumentKind,
    },

    /// The return must be approved before money moves.
    #[error("Cannot refund a return in {status} status")]
    RefundRequiresApproval {
        /// Status of the return document.
        status: DocumentStatus,
    },

    /// The refund amount must be positive and within the return total.
    #[error("Refund of {requested} is outside the refundable range of {limit}")]
    RefundAmountOutOfRange {
        /// Amount asked for.
        requested: Decimal,
        /// Maximum amount that may be refunded.
        limit: Decimal,
    },
}

impl DocumentError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLines
            | Self::NonPositiveQuantity { .. }
            | Self::NegativeUnitPrice { .. }
            | Self::NegativeDiscount
            | Self::ReasonRequired
            | Self::NotReturnable { .. }
            | Self::OverReturn { .. }
            | Self::RefundOnNonSaleReturn { .. }
            | Self::RefundAmountOutOfRange { .. } => "VALIDATION_ERROR",
            Self::UnknownProduct(_) => "REFERENCE_INTEGRITY_ERROR",
            Self::InvalidTransition { .. }
            | Self::NotEditable { .. }
            | Self::NotDeletable { .. }
            | Self::ParentNotRealized { .. }
            | Self::RefundRequiresApproval { .. } => "ILLEGAL_STATE_TRANSITION",
            Self::RefundAlreadyProcessed => "REFUND_ALREADY_PROCESSED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transition_error_message() {
        let err = DocumentError::InvalidTransition {
            from: DocumentStatus::Completed,
            to: DocumentStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition document from completed to cancelled"
        );
        assert_eq!(err.error_code(), "ILLEGAL_STATE_TRANSITION");
    }

    #[test]
    fn test_over_return_carries_quantities() {
        let product = ProductId::new();
        let err = DocumentError::OverReturn {
            product,
            requested: dec!(6),
            returnable: dec!(5),
        };
        assert!(err.to_string().contains("6"));
        assert!(err.to_string().contains("5"));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_refund_codes() {
        assert_eq!(
            DocumentError::RefundAlreadyProcessed.error_code(),
            "REFUND_ALREADY_PROCESSED"
        );
        let err = DocumentError::RefundRequiresApproval {
            status: DocumentStatus::Draft,
        };
        assert_eq!(err.error_code(), "ILLEGAL_STATE_TRANSITION");
    }

    #[test]
    fn test_unknown_product_is_reference_error() {
        let err = DocumentError::UnknownProduct(ProductId::new());
        assert_eq!(err.error_code(), "REFERENCE_INTEGRITY_ERROR");
    }
}
