//! Property-based tests for posting validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_shared::types::AccountId;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntryInput, EntrySide, PostingPair};
use super::validation::validate_posting;

/// Strategy for generating random account IDs.
fn arb_account() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating a balanced debit/credit pair.
fn arb_pair() -> impl Strategy<Value = PostingPair> {
    (arb_account(), arb_account(), arb_amount()).prop_map(|(debit, credit, amount)| PostingPair {
        debit,
        credit,
        amount,
        description: "pair".to_string(),
    })
}

/// Strategy for generating a group composed of 1-5 balanced pairs.
fn arb_pair_group() -> impl Strategy<Value = Vec<EntryInput>> {
    prop::collection::vec(arb_pair(), 1..5).prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(PostingPair::into_lines)
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property: groups built from pairs always validate
    // =========================================================================

    /// Any composition of balanced pairs passes validation.
    #[test]
    fn prop_pair_groups_always_balance(lines in arb_pair_group()) {
        let totals = validate_posting(&lines);
        prop_assert!(totals.is_ok());
        prop_assert!(totals.unwrap().is_balanced());
    }

    /// Totals returned by validation equal the sum over the lines.
    #[test]
    fn prop_totals_match_line_sums(lines in arb_pair_group()) {
        let totals = validate_posting(&lines).unwrap();
        let debits: Decimal = lines
            .iter()
            .filter(|l| l.side == EntrySide::Debit)
            .map(|l| l.amount)
            .sum();
        let credits: Decimal = lines
            .iter()
            .filter(|l| l.side == EntrySide::Credit)
            .map(|l| l.amount)
            .sum();
        prop_assert_eq!(totals.debits, debits);
        prop_assert_eq!(totals.credits, credits);
    }

    /// Signed amounts of a valid group always sum to zero.
    #[test]
    fn prop_signed_amounts_sum_to_zero(lines in arb_pair_group()) {
        validate_posting(&lines).unwrap();
        let signed: Decimal = lines.iter().map(EntryInput::signed_amount).sum();
        prop_assert_eq!(signed, Decimal::ZERO);
    }

    // =========================================================================
    // Property: skewing a valid group breaks it
    // =========================================================================

    /// Adding an unmatched line to a balanced group always fails validation.
    #[test]
    fn prop_extra_line_unbalances(
        mut lines in arb_pair_group(),
        account in arb_account(),
        amount in arb_amount(),
    ) {
        lines.push(EntryInput::debit(account, amount, "skew"));
        prop_assert!(
            matches!(
                validate_posting(&lines),
                Err(LedgerError::Unbalanced { .. })
            ),
            "expected Err(LedgerError::Unbalanced)"
        );
    }

    /// Validation order does not matter for balanced groups.
    #[test]
    fn prop_validation_is_order_independent(mut lines in arb_pair_group()) {
        let forward = validate_posting(&lines).unwrap();
        lines.reverse();
        let backward = validate_posting(&lines).unwrap();
        prop_assert_eq!(forward.debits, backward.debits);
        prop_assert_eq!(forward.credits, backward.credits);
    }
}
