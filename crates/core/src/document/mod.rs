//! Document engine logic.
//!
//! Sales, purchases and returns are documents sharing one lifecycle. This
//! module holds the pure pieces of the engine:
//! - Kinds, statuses and line inputs
//! - Totals (tax on subtotal, capped discounts, two decimal places)
//! - The lifecycle state machine
//! - Validation of lines, returns and refund requests
//! - Realization planning (stock movements plus balanced posting pairs)

pub mod error;
pub mod realization;
pub mod totals;
pub mod types;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod totals_props;
#[cfg(test)]
mod workflow_props;

pub use error::DocumentError;
pub use realization::{PostingWarning, RealizationPlan, RealizationService};
pub use totals::{compute_totals, round_money};
pub use types::{
    Discount, DocumentKind, DocumentStatus, DocumentTotals, LineInput, RefundStatus,
};
pub use validation::{
    validate_lines, validate_reason, validate_refund_request, validate_return_lines,
};
pub use workflow::DocumentWorkflow;
