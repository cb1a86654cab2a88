//! Property-based tests for document totals.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use stockbook_shared::types::ProductId;

use super::totals::{compute_totals, round_money};
use super::types::{Discount, LineInput};

/// Strategy for generating random product IDs.
fn arb_product() -> impl Strategy<Value = ProductId> {
    any::<u128>().prop_map(|n| ProductId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating a valid document line.
fn arb_line() -> impl Strategy<Value = LineInput> {
    (arb_product(), 1i64..10_000i64, 0i64..1_000_000i64).prop_map(
        |(product, quantity, unit_price)| {
            LineInput::new(product, Decimal::new(quantity, 1), Decimal::new(unit_price, 2))
        },
    )
}

/// Strategy for generating 1-8 valid lines.
fn arb_lines() -> impl Strategy<Value = Vec<LineInput>> {
    prop::collection::vec(arb_line(), 1..8)
}

/// Strategy for generating a tax rate between 0 and 30 percent.
fn arb_tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..3000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating any discount shape.
fn arb_discount() -> impl Strategy<Value = Discount> {
    prop_oneof![
        Just(Discount::None),
        (0i64..1_000_000i64).prop_map(|n| Discount::Flat(Decimal::new(n, 2))),
        (0i64..15000i64).prop_map(|n| Discount::Percent(Decimal::new(n, 2))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property: the totals identity always holds
    // =========================================================================

    /// Total equals subtotal plus tax minus discount, exactly.
    #[test]
    fn prop_totals_identity(
        lines in arb_lines(),
        rate in arb_tax_rate(),
        discount in arb_discount(),
    ) {
        let totals = compute_totals(&lines, rate, discount).unwrap();
        prop_assert_eq!(
            totals.total,
            totals.subtotal + totals.tax_amount - totals.discount_amount
        );
    }

    /// Every component carries at most two decimal places.
    #[test]
    fn prop_components_are_money(
        lines in arb_lines(),
        rate in arb_tax_rate(),
        discount in arb_discount(),
    ) {
        let totals = compute_totals(&lines, rate, discount).unwrap();
        prop_assert_eq!(round_money(totals.subtotal), totals.subtotal);
        prop_assert_eq!(round_money(totals.tax_amount), totals.tax_amount);
        prop_assert_eq!(round_money(totals.discount_amount), totals.discount_amount);
        prop_assert_eq!(round_money(totals.total), totals.total);
    }

    // =========================================================================
    // Property: discounts are capped, totals never go negative
    // =========================================================================

    /// The discount never exceeds the subtotal, whatever its shape.
    #[test]
    fn prop_discount_capped_at_subtotal(
        lines in arb_lines(),
        rate in arb_tax_rate(),
        discount in arb_discount(),
    ) {
        let totals = compute_totals(&lines, rate, discount).unwrap();
        prop_assert!(totals.discount_amount <= totals.subtotal);
        prop_assert!(totals.discount_amount >= Decimal::ZERO);
    }

    /// With tax on the full subtotal and a capped discount, the total can
    /// fall to the tax amount but never below it.
    #[test]
    fn prop_total_at_least_tax(
        lines in arb_lines(),
        rate in arb_tax_rate(),
        discount in arb_discount(),
    ) {
        let totals = compute_totals(&lines, rate, discount).unwrap();
        prop_assert!(totals.total >= totals.tax_amount);
    }

    /// A zero tax rate charges no tax.
    #[test]
    fn prop_zero_rate_no_tax(lines in arb_lines(), discount in arb_discount()) {
        let totals = compute_totals(&lines, Decimal::ZERO, discount).unwrap();
        prop_assert_eq!(totals.tax_amount, Decimal::ZERO);
    }

    /// Without a discount, the total is exactly subtotal plus tax.
    #[test]
    fn prop_no_discount_total(lines in arb_lines(), rate in arb_tax_rate()) {
        let totals = compute_totals(&lines, rate, Discount::None).unwrap();
        prop_assert_eq!(totals.discount_amount, Decimal::ZERO);
        prop_assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
    }
}
