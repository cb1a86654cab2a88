//! Account balance calculations.
//!
//! Balances are always derived from entries at query time, never stored.
//! Debit-normal accounts (asset, expense) grow with debits; credit-normal
//! accounts (liability, equity, income) grow with credits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockbook_shared::types::AccountId;

use super::types::{AccountType, EntrySide};

impl AccountType {
    /// Returns the signed balance effect of the given debit/credit amounts.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

/// Account balance derived from its entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Type driving the sign interpretation.
    pub account_type: AccountType,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance per the account type's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Creates an empty balance for an account.
    #[must_use]
    pub fn new(account_id: AccountId, account_type: AccountType) -> Self {
        Self {
            account_id,
            account_type,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// Creates a balance from already-summed totals.
    #[must_use]
    pub fn from_totals(
        account_id: AccountId,
        account_type: AccountType,
        debit_total: Decimal,
        credit_total: Decimal,
    ) -> Self {
        Self {
            account_id,
            account_type,
            debit_total,
            credit_total,
            balance: account_type.balance_change(debit_total, credit_total),
        }
    }

    /// Folds one entry into the balance.
    pub fn accumulate(&mut self, side: EntrySide, amount: Decimal) {
        match side {
            EntrySide::Debit => self.debit_total += amount,
            EntrySide::Credit => self.credit_total += amount,
        }
        self.balance = self
            .account_type
            .balance_change(self.debit_total, self.credit_total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_normal_balance_change() {
        // Debits grow assets, credits shrink them.
        assert_eq!(
            AccountType::Asset.balance_change(dec!(100), dec!(0)),
            dec!(100)
        );
        assert_eq!(
            AccountType::Asset.balance_change(dec!(0), dec!(50)),
            dec!(-50)
        );
        assert_eq!(
            AccountType::Expense.balance_change(dec!(100), dec!(30)),
            dec!(70)
        );
    }

    #[test]
    fn test_credit_normal_balance_change() {
        assert_eq!(
            AccountType::Income.balance_change(dec!(0), dec!(100)),
            dec!(100)
        );
        assert_eq!(
            AccountType::Liability.balance_change(dec!(50), dec!(0)),
            dec!(-50)
        );
        assert_eq!(
            AccountType::Equity.balance_change(dec!(30), dec!(100)),
            dec!(70)
        );
    }

    #[test]
    fn test_accumulate_matches_from_totals() {
        let id = AccountId::new();
        let mut running = AccountBalance::new(id, AccountType::Asset);
        running.accumulate(EntrySide::Debit, dec!(99.00));
        running.accumulate(EntrySide::Credit, dec!(36.00));
        running.accumulate(EntrySide::Debit, dec!(1.00));

        let summed = AccountBalance::from_totals(id, AccountType::Asset, dec!(100.00), dec!(36.00));
        assert_eq!(running.balance, summed.balance);
        assert_eq!(running.balance, dec!(64.00));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Flipping the normal side negates the balance for the same totals.
        #[test]
        fn prop_normal_sides_mirror(debit in amount_strategy(), credit in amount_strategy()) {
            let debit_normal = AccountType::Asset.balance_change(debit, credit);
            let credit_normal = AccountType::Liability.balance_change(debit, credit);
            prop_assert_eq!(debit_normal, -credit_normal);
        }

        /// Accumulation order never changes the final balance.
        #[test]
        fn prop_accumulation_is_order_independent(
            amounts in prop::collection::vec((any::<bool>(), amount_strategy()), 1..20),
        ) {
            let id = AccountId::new();

            let mut forward = AccountBalance::new(id, AccountType::Asset);
            for (is_debit, amount) in &amounts {
                let side = if *is_debit { EntrySide::Debit } else { EntrySide::Credit };
                forward.accumulate(side, *amount);
            }

            let mut backward = AccountBalance::new(id, AccountType::Asset);
            for (is_debit, amount) in amounts.iter().rev() {
                let side = if *is_debit { EntrySide::Debit } else { EntrySide::Credit };
                backward.accumulate(side, *amount);
            }

            prop_assert_eq!(forward.balance, backward.balance);
            prop_assert_eq!(forward.debit_total, backward.debit_total);
            prop_assert_eq!(forward.credit_total, backward.credit_total);
        }

        /// The folded balance always equals the sign rule applied to totals.
        #[test]
        fn prop_balance_consistent_with_totals(
            amounts in prop::collection::vec((any::<bool>(), amount_strategy()), 0..20),
        ) {
            let id = AccountId::new();
            let mut balance = AccountBalance::new(id, AccountType::Income);
            for (is_debit, amount) in &amounts {
                let side = if *is_debit { EntrySide::Debit } else { EntrySide::Credit };
                balance.accumulate(side, *amount);
            }

            prop_assert_eq!(
                balance.balance,
                AccountType::Income.balance_change(balance.debit_total, balance.credit_total)
            );
        }
    }
}
