//! Monetary totals for documents.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::DocumentError;
use super::types::{Discount, DocumentTotals, LineInput};

/// Rounds a monetary value to two decimal places, midpoints away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the totals of a document.
///
/// Tax is charged on the undiscounted subtotal at `tax_rate` percent. The
/// discount is resolved to an amount and capped at the subtotal, so the
/// discount can cancel the goods value but never the tax. Every component is
/// rounded to two decimal places before it enters the total.
///
/// # Errors
///
/// Returns [`DocumentError::NegativeDiscount`] when the discount amount or
/// percentage is negative.
pub fn compute_totals(
    lines: &[LineInput],
    tax_rate: Decimal,
    discount: Discount,
) -> Result<DocumentTotals, DocumentError> {
    let subtotal = round_money(lines.iter().map(LineInput::line_total).sum());
    let tax_amount = round_money(subtotal * tax_rate / Decimal::ONE_HUNDRED);

    let discount_amount = match discount {
        Discount::None => Decimal::ZERO,
        Discount::Flat(amount) => {
            if amount < Decimal::ZERO {
                return Err(DocumentError::NegativeDiscount);
            }
            round_money(amount).min(subtotal)
        }
        Discount::Percent(percent) => {
            if percent < Decimal::ZERO {
                return Err(DocumentError::NegativeDiscount);
            }
            round_money(subtotal * percent / Decimal::ONE_HUNDRED).min(subtotal)
        }
    };

    Ok(DocumentTotals {
        subtotal,
        tax_amount,
        discount_amount,
        total: subtotal + tax_amount - discount_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockbook_shared::types::ProductId;

    fn line(quantity: Decimal, unit_price: Decimal) -> LineInput {
        LineInput::new(ProductId::new(), quantity, unit_price)
    }

    #[test]
    fn test_sale_with_ten_percent_tax() {
        let totals =
            compute_totals(&[line(dec!(3), dec!(30))], dec!(10), Discount::None).unwrap();
        assert_eq!(totals.subtotal, dec!(90));
        assert_eq!(totals.tax_amount, dec!(9));
        assert_eq!(totals.discount_amount, dec!(0));
        assert_eq!(totals.total, dec!(99));
    }

    #[test]
    fn test_zero_rate_charges_no_tax() {
        let totals =
            compute_totals(&[line(dec!(2), dec!(12.50))], dec!(0), Discount::None).unwrap();
        assert_eq!(totals.tax_amount, dec!(0));
        assert_eq!(totals.total, dec!(25));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        // 10 * 1.25% = 0.125, which must round to 0.13 rather than 0.12.
        let totals =
            compute_totals(&[line(dec!(1), dec!(10))], dec!(1.25), Discount::None).unwrap();
        assert_eq!(totals.tax_amount, dec!(0.13));
    }

    #[test]
    fn test_flat_discount_reduces_total() {
        let totals = compute_totals(
            &[line(dec!(3), dec!(30))],
            dec!(10),
            Discount::Flat(dec!(15)),
        )
        .unwrap();
        assert_eq!(totals.discount_amount, dec!(15));
        assert_eq!(totals.total, dec!(84));
    }

    #[test]
    fn test_flat_discount_capped_at_subtotal() {
        let totals = compute_totals(
            &[line(dec!(3), dec!(30))],
            dec!(10),
            Discount::Flat(dec!(200)),
        )
        .unwrap();
        assert_eq!(totals.discount_amount, dec!(90));
        assert_eq!(totals.total, dec!(9));
    }

    #[test]
    fn test_percent_discount() {
        let totals = compute_totals(
            &[line(dec!(4), dec!(25))],
            dec!(0),
            Discount::Percent(dec!(10)),
        )
        .unwrap();
        assert_eq!(totals.discount_amount, dec!(10));
        assert_eq!(totals.total, dec!(90));
    }

    #[test]
    fn test_percent_discount_capped_at_subtotal() {
        let totals = compute_totals(
            &[line(dec!(1), dec!(50))],
            dec!(0),
            Discount::Percent(dec!(150)),
        )
        .unwrap();
        assert_eq!(totals.discount_amount, dec!(50));
        assert_eq!(totals.total, dec!(0));
    }

    #[test]
    fn test_negative_discount_rejected() {
        assert_eq!(
            compute_totals(&[line(dec!(1), dec!(10))], dec!(0), Discount::Flat(dec!(-1))),
            Err(DocumentError::NegativeDiscount)
        );
        assert_eq!(
            compute_totals(
                &[line(dec!(1), dec!(10))],
                dec!(0),
                Discount::Percent(dec!(-5))
            ),
            Err(DocumentError::NegativeDiscount)
        );
    }

    #[test]
    fn test_multi_line_subtotal() {
        let totals = compute_totals(
            &[line(dec!(2), dec!(9.99)), line(dec!(1), dec!(0.02))],
            dec!(11),
            Discount::None,
        )
        .unwrap();
        assert_eq!(totals.subtotal, dec!(20));
        assert_eq!(totals.tax_amount, dec!(2.20));
        assert_eq!(totals.total, dec!(22.20));
    }
}
