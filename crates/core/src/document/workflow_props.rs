//! Property-based tests for the document lifecycle.

use proptest::prelude::*;

use super::types::DocumentStatus;
use super::workflow::DocumentWorkflow;

/// Strategy for generating any document status.
fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop_oneof![
        Just(DocumentStatus::Draft),
        Just(DocumentStatus::Pending),
        Just(DocumentStatus::Completed),
        Just(DocumentStatus::Approved),
        Just(DocumentStatus::Cancelled),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property: granted transitions agree with the transition table
    // =========================================================================

    /// Whatever submit grants is an edge the table also allows.
    #[test]
    fn prop_submit_agrees_with_table(status in arb_status()) {
        match DocumentWorkflow::submit(status) {
            Ok(next) => prop_assert!(DocumentWorkflow::is_valid_transition(status, next)),
            Err(_) => prop_assert!(
                !DocumentWorkflow::is_valid_transition(status, DocumentStatus::Pending)
            ),
        }
    }

    /// Whatever process grants is an edge the table also allows.
    #[test]
    fn prop_process_agrees_with_table(status in arb_status()) {
        match DocumentWorkflow::process(status) {
            Ok(next) => prop_assert!(DocumentWorkflow::is_valid_transition(status, next)),
            Err(_) => prop_assert!(
                !DocumentWorkflow::is_valid_transition(status, DocumentStatus::Completed)
            ),
        }
    }

    /// Approval of documents and returns both land on table edges.
    #[test]
    fn prop_approvals_agree_with_table(status in arb_status()) {
        if let Ok(next) = DocumentWorkflow::approve(status) {
            prop_assert!(DocumentWorkflow::is_valid_transition(status, next));
        }
        if let Ok(next) = DocumentWorkflow::approve_return(status) {
            prop_assert!(DocumentWorkflow::is_valid_transition(status, next));
        }
    }

    // =========================================================================
    // Property: realized and cancelled documents are frozen
    // =========================================================================

    /// No transition leaves a realized status.
    #[test]
    fn prop_realized_is_frozen(from in arb_status(), to in arb_status()) {
        if from.is_realized() {
            prop_assert!(!DocumentWorkflow::is_valid_transition(from, to));
        }
    }

    /// No transition leaves a terminal status.
    #[test]
    fn prop_terminal_is_frozen(from in arb_status(), to in arb_status()) {
        if from.is_terminal() {
            prop_assert!(!DocumentWorkflow::is_valid_transition(from, to));
        }
    }

    /// Editing, deleting and cancelling are granted for exactly the
    /// editable statuses.
    #[test]
    fn prop_mutation_gates_match_editability(status in arb_status()) {
        prop_assert_eq!(
            DocumentWorkflow::ensure_editable(status).is_ok(),
            status.is_editable()
        );
        prop_assert_eq!(
            DocumentWorkflow::ensure_deletable(status).is_ok(),
            status.is_editable()
        );
        prop_assert_eq!(DocumentWorkflow::cancel(status).is_ok(), status.is_editable());
    }

    /// Every granted transition moves to a different status.
    #[test]
    fn prop_no_self_transitions(from in arb_status(), to in arb_status()) {
        if DocumentWorkflow::is_valid_transition(from, to) {
            prop_assert_ne!(from, to);
        }
    }
}
