//! Business rule validation for posting groups.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryInput, EntrySide, PostingTotals};

/// Validates a posting group before it is written.
///
/// Checks that the group has at least two lines, touches both sides of the
/// book, carries only positive amounts, and balances. The returned totals are
/// the amounts that were verified equal.
///
/// # Errors
///
/// Returns an error if any rule is violated; nothing from a rejected group
/// may be written.
pub fn validate_posting(lines: &[EntryInput]) -> Result<PostingTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientEntries);
    }

    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for line in lines {
        if line.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if line.amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount);
        }

        match line.side {
            EntrySide::Debit => {
                debits += line.amount;
                has_debit = true;
            }
            EntrySide::Credit => {
                credits += line.amount;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if debits != credits {
        return Err(LedgerError::Unbalanced { debits, credits });
    }

    Ok(PostingTotals { debits, credits })
}
