//! Reversing entries for correcting realized ledger state.
//!
//! Posted groups are never edited or deleted in place. A correction posts a
//! new group with debits and credits swapped, tagged back to the original, so
//! the journal keeps the full history.

use super::error::LedgerError;
use super::types::{EntryInput, PostingTotals};
use super::validation::validate_posting;

/// A planned reversing group, ready to be posted.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    /// The reversing lines, sides swapped, amounts preserved.
    pub lines: Vec<EntryInput>,
    /// Description for the reversing group.
    pub description: String,
    /// Totals of the original group (equal to the reversal's totals).
    pub totals: PostingTotals,
}

/// Stateless planner for reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Plans a reversing group for already-posted entries.
    ///
    /// For each original line the side is swapped and the amount, account,
    /// and order are preserved; line descriptions gain a `Reversal: ` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NothingToReverse`] when the original group is
    /// empty, or a validation error if the stored group no longer balances
    /// (which would indicate corruption and must stop the reversal).
    pub fn plan(
        original: &[EntryInput],
        source_label: &str,
        reason: &str,
    ) -> Result<ReversalPlan, LedgerError> {
        if original.is_empty() {
            return Err(LedgerError::NothingToReverse);
        }

        let totals = validate_posting(original)?;

        let lines: Vec<EntryInput> = original
            .iter()
            .map(|line| EntryInput {
                account: line.account,
                side: line.side.flipped(),
                amount: line.amount,
                description: Some(match &line.description {
                    Some(d) => format!("Reversal: {d}"),
                    None => "Reversal".to_string(),
                }),
            })
            .collect();

        // The swap preserves amounts, so this can only fail if flipping broke
        // an invariant; rechecking keeps the guarantee local.
        validate_posting(&lines)?;

        Ok(ReversalPlan {
            lines,
            description: format!("Reversal of {source_label}. Reason: {reason}"),
            totals,
        })
    }
}
