//! Property-based tests for reversal planning.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_shared::types::AccountId;
use uuid::Uuid;

use super::reversal::ReversalService;
use super::types::{EntryInput, EntrySide, PostingPair};
use super::validation::validate_posting;

fn arb_account() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a posted group of 1-4 balanced pairs.
fn arb_posted_group() -> impl Strategy<Value = Vec<EntryInput>> {
    prop::collection::vec(
        (arb_account(), arb_account(), arb_amount()),
        1..4,
    )
    .prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(|(debit, credit, amount)| {
                PostingPair {
                    debit,
                    credit,
                    amount,
                    description: "posted".to_string(),
                }
                .into_lines()
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The reversal of any balanced group is itself balanced.
    #[test]
    fn prop_reversal_balances(original in arb_posted_group()) {
        let plan = ReversalService::plan(&original, "group", "test").unwrap();
        prop_assert!(validate_posting(&plan.lines).is_ok());
    }

    /// Original plus reversal nets to zero on every account.
    #[test]
    fn prop_reversal_cancels_original(original in arb_posted_group()) {
        let plan = ReversalService::plan(&original, "group", "test").unwrap();

        let mut net: std::collections::HashMap<AccountId, Decimal> =
            std::collections::HashMap::new();
        for line in original.iter().chain(plan.lines.iter()) {
            *net.entry(line.account).or_default() += line.signed_amount();
        }

        for (_, amount) in net {
            prop_assert_eq!(amount, Decimal::ZERO);
        }
    }

    /// Every reversal line swaps the side and keeps the amount.
    #[test]
    fn prop_reversal_swaps_each_line(original in arb_posted_group()) {
        let plan = ReversalService::plan(&original, "group", "test").unwrap();
        prop_assert_eq!(plan.lines.len(), original.len());

        for (orig, rev) in original.iter().zip(plan.lines.iter()) {
            prop_assert_eq!(orig.account, rev.account);
            prop_assert_eq!(orig.amount, rev.amount);
            prop_assert_ne!(orig.side, rev.side);
        }
    }

    /// Reversing a reversal restores the original sides.
    #[test]
    fn prop_double_reversal_restores_sides(original in arb_posted_group()) {
        let once = ReversalService::plan(&original, "group", "first").unwrap();
        let twice = ReversalService::plan(&once.lines, "group", "second").unwrap();

        for (orig, back) in original.iter().zip(twice.lines.iter()) {
            prop_assert_eq!(orig.side, back.side);
            prop_assert_eq!(orig.amount, back.amount);
        }
    }

    /// Debit lines always become credit lines and vice versa.
    #[test]
    fn prop_side_counts_swap(original in arb_posted_group()) {
        let plan = ReversalService::plan(&original, "group", "test").unwrap();

        let debits_before = original.iter().filter(|l| l.side == EntrySide::Debit).count();
        let credits_after = plan.lines.iter().filter(|l| l.side == EntrySide::Credit).count();
        prop_assert_eq!(debits_before, credits_after);
    }
}
