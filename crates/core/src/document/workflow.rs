//! Document lifecycle state machine.
//!
//! All status transitions go through [`DocumentWorkflow`], which enforces the
//! valid edges and returns the resulting status. Persistence and the actual
//! stock and ledger effects live elsewhere; this module only answers whether
//! a transition is allowed.

use super::error::DocumentError;
use super::types::DocumentStatus;

/// Service for pure, stateless document transition rules.
pub struct DocumentWorkflow;

impl DocumentWorkflow {
    /// Submits a draft document for approval.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidTransition`] if the document is not
    /// in `Draft` status.
    pub fn submit(current: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        match current {
            DocumentStatus::Draft => Ok(DocumentStatus::Pending),
            _ => Err(DocumentError::InvalidTransition {
                from: current,
                to: DocumentStatus::Pending,
            }),
        }
    }

    /// Processes a draft document directly to completion.
    ///
    /// This is the no-approval path: stock and ledger effects are applied by
    /// the caller once the transition is granted.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidTransition`] if the document is not
    /// in `Draft` status.
    pub fn process(current: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        match current {
            DocumentStatus::Draft => Ok(DocumentStatus::Completed),
            _ => Err(DocumentError::InvalidTransition {
                from: current,
                to: DocumentStatus::Completed,
            }),
        }
    }

    /// Approves a pending document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidTransition`] if the document is not
    /// in `Pending` status.
    pub fn approve(current: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        match current {
            DocumentStatus::Pending => Ok(DocumentStatus::Approved),
            _ => Err(DocumentError::InvalidTransition {
                from: current,
                to: DocumentStatus::Approved,
            }),
        }
    }

    /// Approves a return document.
    ///
    /// Returns are allowed to skip the submit step: a draft return can be
    /// approved directly, since approval is the only gate before its inverse
    /// effects apply.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidTransition`] if the return has
    /// already been realized or cancelled.
    pub fn approve_return(current: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        match current {
            DocumentStatus::Draft | DocumentStatus::Pending => Ok(DocumentStatus::Approved),
            _ => Err(DocumentError::InvalidTransition {
                from: current,
                to: DocumentStatus::Approved,
            }),
        }
    }

    /// Cancels a document that has not been realized.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidTransition`] if effects have already
    /// been applied or the document is already cancelled.
    pub fn cancel(current: DocumentStatus) -> Result<DocumentStatus, DocumentError> {
        match current {
            DocumentStatus::Draft | DocumentStatus::Pending => Ok(DocumentStatus::Cancelled),
            _ => Err(DocumentError::InvalidTransition {
                from: current,
                to: DocumentStatus::Cancelled,
            }),
        }
    }

    /// Checks that a document may still be modified.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotEditable`] once the document is realized
    /// or cancelled.
    pub fn ensure_editable(current: DocumentStatus) -> Result<(), DocumentError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(DocumentError::NotEditable { status: current })
        }
    }

    /// Checks that a document may be deleted.
    ///
    /// Deletion follows the same rule as editing: anything realized or
    /// cancelled stays on record.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotDeletable`] once the document is realized
    /// or cancelled.
    pub fn ensure_deletable(current: DocumentStatus) -> Result<(), DocumentError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(DocumentError::NotDeletable { status: current })
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Pending (submit)
    /// - Draft → Completed (process)
    /// - Draft → Approved (return approval only)
    /// - Pending → Approved (approve)
    /// - Draft | Pending → Cancelled (cancel)
    #[must_use]
    pub fn is_valid_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
        matches!(
            (from, to),
            (
                DocumentStatus::Draft,
                DocumentStatus::Pending
                    | DocumentStatus::Completed
                    | DocumentStatus::Approved
                    | DocumentStatus::Cancelled
            ) | (
                DocumentStatus::Pending,
                DocumentStatus::Approved | DocumentStatus::Cancelled
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let result = DocumentWorkflow::submit(DocumentStatus::Draft);
        assert_eq!(result, Ok(DocumentStatus::Pending));
    }

    #[test]
    fn test_submit_from_non_draft_fails() {
        let result = DocumentWorkflow::submit(DocumentStatus::Completed);
        assert_eq!(
            result,
            Err(DocumentError::InvalidTransition {
                from: DocumentStatus::Completed,
                to: DocumentStatus::Pending,
            })
        );
    }

    #[test]
    fn test_process_from_draft() {
        assert_eq!(
            DocumentWorkflow::process(DocumentStatus::Draft),
            Ok(DocumentStatus::Completed)
        );
    }

    #[test]
    fn test_process_twice_fails() {
        assert!(matches!(
            DocumentWorkflow::process(DocumentStatus::Completed),
            Err(DocumentError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_pending() {
        assert_eq!(
            DocumentWorkflow::approve(DocumentStatus::Pending),
            Ok(DocumentStatus::Approved)
        );
    }

    #[test]
    fn test_approve_from_draft_fails() {
        assert!(matches!(
            DocumentWorkflow::approve(DocumentStatus::Draft),
            Err(DocumentError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_return_approval_accepts_draft_and_pending() {
        assert_eq!(
            DocumentWorkflow::approve_return(DocumentStatus::Draft),
            Ok(DocumentStatus::Approved)
        );
        assert_eq!(
            DocumentWorkflow::approve_return(DocumentStatus::Pending),
            Ok(DocumentStatus::Approved)
        );
        assert!(DocumentWorkflow::approve_return(DocumentStatus::Approved).is_err());
    }

    #[test]
    fn test_cancel_before_realization_only() {
        assert_eq!(
            DocumentWorkflow::cancel(DocumentStatus::Draft),
            Ok(DocumentStatus::Cancelled)
        );
        assert_eq!(
            DocumentWorkflow::cancel(DocumentStatus::Pending),
            Ok(DocumentStatus::Cancelled)
        );
        assert!(DocumentWorkflow::cancel(DocumentStatus::Approved).is_err());
        assert!(DocumentWorkflow::cancel(DocumentStatus::Cancelled).is_err());
    }

    #[test]
    fn test_completed_document_cannot_be_deleted() {
        assert_eq!(
            DocumentWorkflow::ensure_deletable(DocumentStatus::Completed),
            Err(DocumentError::NotDeletable {
                status: DocumentStatus::Completed
            })
        );
        assert!(DocumentWorkflow::ensure_deletable(DocumentStatus::Draft).is_ok());
    }

    #[test]
    fn test_realized_document_cannot_be_edited() {
        assert_eq!(
            DocumentWorkflow::ensure_editable(DocumentStatus::Approved),
            Err(DocumentError::NotEditable {
                status: DocumentStatus::Approved
            })
        );
        assert!(DocumentWorkflow::ensure_editable(DocumentStatus::Pending).is_ok());
    }

    #[test]
    fn test_transition_table() {
        assert!(DocumentWorkflow::is_valid_transition(
            DocumentStatus::Draft,
            DocumentStatus::Pending
        ));
        assert!(DocumentWorkflow::is_valid_transition(
            DocumentStatus::Pending,
            DocumentStatus::Approved
        ));
        assert!(!DocumentWorkflow::is_valid_transition(
            DocumentStatus::Completed,
            DocumentStatus::Draft
        ));
        assert!(!DocumentWorkflow::is_valid_transition(
            DocumentStatus::Cancelled,
            DocumentStatus::Pending
        ));
    }
}
