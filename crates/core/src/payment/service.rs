//! Payment posting rules.

use rust_decimal::Decimal;
use stockbook_shared::types::AccountId;

use crate::document::round_money;
use crate::ledger::{PaymentMethod, PostingPair, WellKnownAccount};

use super::error::PaymentError;
use super::types::PaymentKind;

/// Service for pure, stateless payment posting rules.
pub struct PaymentService;

impl PaymentService {
    /// Plans the single posting pair of a payment.
    ///
    /// The pair per kind, with `money` being the cash or bank account of
    /// the chosen method:
    /// - `CustomerReceipt`: debit money / credit receivable
    /// - `SupplierPayment`: debit payable / credit money
    /// - `Expense`: debit the given expense account / credit money
    /// - `BankDeposit`: debit bank / credit cash
    /// - `BankWithdrawal`: debit cash / credit bank
    ///
    /// # Errors
    ///
    /// Returns an error when the amount is not positive, when an expense
    /// payment names no expense account, or when a required well-known
    /// account is missing from the chart.
    pub fn plan<A>(
        kind: PaymentKind,
        method: PaymentMethod,
        amount: Decimal,
        reference: &str,
        expense_account: Option<AccountId>,
        account_of: A,
    ) -> Result<PostingPair, PaymentError>
    where
        A: Fn(WellKnownAccount) -> Option<AccountId>,
    {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount { requested: amount });
        }

        let resolve = |account: WellKnownAccount| {
            account_of(account).ok_or(PaymentError::MissingAccount { account })
        };

        let (debit, credit) = match kind {
            PaymentKind::CustomerReceipt => (
                resolve(method.money_account())?,
                resolve(WellKnownAccount::AccountsReceivable)?,
            ),
            PaymentKind::SupplierPayment => (
                resolve(WellKnownAccount::AccountsPayable)?,
                resolve(method.money_account())?,
            ),
            PaymentKind::Expense => {
                let expense = expense_account.ok_or(PaymentError::ExpenseAccountRequired)?;
                (expense, resolve(method.money_account())?)
            }
            PaymentKind::BankDeposit => (
                resolve(WellKnownAccount::Bank)?,
                resolve(WellKnownAccount::Cash)?,
            ),
            PaymentKind::BankWithdrawal => (
                resolve(WellKnownAccount::Cash)?,
                resolve(WellKnownAccount::Bank)?,
            ),
        };

        Ok(PostingPair {
            debit,
            credit,
            amount: round_money(amount),
            description: format!("{kind} {reference}"),
        })
    }

    /// Applies a receipt to a document's paid amount, capped at its total.
    #[must_use]
    pub fn bump_paid(paid: Decimal, total: Decimal, amount: Decimal) -> Decimal {
        (paid + amount).min(total)
    }
}
