//! Realization plans: the stock and ledger effects of a document.
//!
//! Realizing a document means applying its movements to stock and its
//! posting pairs to the ledger, in that order, inside one transaction.
//! [`RealizationService`] computes both sets of effects up front from pure
//! inputs so the persistence layer only has to execute the plan.
//!
//! Accounts are resolved through a caller-supplied lookup over the
//! well-known chart. A missing account does not block the document: the pair
//! that needed it is skipped and recorded as a warning, while stock effects
//! and the status change go ahead.

use std::fmt;

use rust_decimal::Decimal;
use stockbook_shared::types::{AccountId, ProductId, WarehouseId};

use crate::ledger::{EntryInput, PaymentMethod, PostingPair, WellKnownAccount};
use crate::stock::{LotKey, Movement, MovementKind};

use super::error::DocumentError;
use super::totals::round_money;
use super::types::{DocumentKind, DocumentTotals, LineInput};

/// Warning recorded when a plan had to skip part of its postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingWarning {
    /// A well-known account is missing from the chart, so the pair that
    /// needed it was not posted.
    MissingAccount {
        /// The account that could not be resolved.
        account: WellKnownAccount,
    },
}

impl fmt::Display for PostingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccount { account } => write!(
                f,
                "account {} ({}) is missing from the chart; posting skipped",
                account.code(),
                account.default_name()
            ),
        }
    }
}

/// The effects a document applies when it is realized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizationPlan {
    /// Stock movements, applied before any ledger write.
    pub movements: Vec<Movement>,
    /// Balanced posting pairs for the ledger.
    pub pairs: Vec<PostingPair>,
    /// Postings that had to be skipped.
    pub warnings: Vec<PostingWarning>,
}

impl RealizationPlan {
    /// Expands the posting pairs into ledger entry lines.
    #[must_use]
    pub fn entry_lines(&self) -> Vec<EntryInput> {
        self.pairs
            .iter()
            .cloned()
            .flat_map(PostingPair::into_lines)
            .collect()
    }

    /// Returns true when the plan posts anything to the ledger.
    #[must_use]
    pub fn has_postings(&self) -> bool {
        !self.pairs.is_empty()
    }
}

/// Service computing realization plans from document data.
pub struct RealizationService;

impl RealizationService {
    /// Plans the stock and ledger effects of realizing a document.
    ///
    /// `cost_of` resolves a product to its cost price and returns `None`
    /// only for products that do not exist; a known product without a cost
    /// should resolve to zero. `account_of` resolves well-known accounts to
    /// chart rows; `None` skips the affected pair with a warning.
    ///
    /// Effects per kind:
    /// - `Sale`: issue stock per line; debit receivable / credit sales
    ///   revenue for the total, debit COGS / credit inventory for the cost
    ///   of the goods.
    /// - `Purchase`: receive stock per line, carrying the line's unit price
    ///   as lot cost and its expiry date; debit inventory / credit payable
    ///   for the total.
    /// - `SaleReturn`: take the goods back in at cost; debit sales returns /
    ///   credit receivable for the total, debit inventory / credit COGS for
    ///   the cost.
    /// - `PurchaseReturn`: issue the goods back out; debit payable / credit
    ///   inventory for the total.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownProduct`] when `cost_of` cannot
    /// resolve a product on a kind that needs its cost.
    pub fn plan_document<C, A>(
        kind: DocumentKind,
        warehouse: WarehouseId,
        lines: &[LineInput],
        totals: &DocumentTotals,
        reference: &str,
        cost_of: C,
        account_of: A,
    ) -> Result<RealizationPlan, DocumentError>
    where
        C: Fn(ProductId) -> Option<Decimal>,
        A: Fn(WellKnownAccount) -> Option<AccountId>,
    {
        let mut movements = Vec::with_capacity(lines.len());
        let mut cost_total = Decimal::ZERO;

        for line in lines {
            let key = LotKey::new(line.product, warehouse, line.batch.clone());
            match kind {
                DocumentKind::Sale => {
                    let cost = cost_of(line.product)
                        .ok_or(DocumentError::UnknownProduct(line.product))?;
                    cost_total += line.quantity * cost;
                    movements.push(Movement::outbound(key, line.quantity, MovementKind::Issue));
                }
                DocumentKind::Purchase => {
                    movements.push(Movement::inbound(
                        key,
                        line.quantity,
                        MovementKind::Receipt,
                        Some(line.unit_price),
                        line.expiry_date,
                    ));
                }
                DocumentKind::SaleReturn => {
                    let cost = cost_of(line.product)
                        .ok_or(DocumentError::UnknownProduct(line.product))?;
                    cost_total += line.quantity * cost;
                    movements.push(Movement::inbound(
                        key,
                        line.quantity,
                        MovementKind::ReturnIn,
                        Some(cost),
                        line.expiry_date,
                    ));
                }
                DocumentKind::PurchaseReturn => {
                    movements.push(Movement::outbound(
                        key,
                        line.quantity,
                        MovementKind::ReturnOut,
                    ));
                }
            }
        }
        let cost_total = round_money(cost_total);

        let mut pairs = Vec::new();
        let mut warnings = Vec::new();

        match kind {
            DocumentKind::Sale => {
                resolve_pair(
                    &account_of,
                    WellKnownAccount::AccountsReceivable,
                    WellKnownAccount::SalesRevenue,
                    totals.total,
                    format!("Sale {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
                resolve_pair(
                    &account_of,
                    WellKnownAccount::CostOfGoodsSold,
                    WellKnownAccount::Inventory,
                    cost_total,
                    format!("Cost of goods for {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
            }
            DocumentKind::Purchase => {
                resolve_pair(
                    &account_of,
                    WellKnownAccount::Inventory,
                    WellKnownAccount::AccountsPayable,
                    totals.total,
                    format!("Purchase {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
            }
            DocumentKind::SaleReturn => {
                resolve_pair(
                    &account_of,
                    WellKnownAccount::SalesReturns,
                    WellKnownAccount::AccountsReceivable,
                    totals.total,
                    format!("Sales return {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
                resolve_pair(
                    &account_of,
                    WellKnownAccount::Inventory,
                    WellKnownAccount::CostOfGoodsSold,
                    cost_total,
                    format!("Restock for {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
            }
            DocumentKind::PurchaseReturn => {
                resolve_pair(
                    &account_of,
                    WellKnownAccount::AccountsPayable,
                    WellKnownAccount::Inventory,
                    totals.total,
                    format!("Purchase return {reference}"),
                    &mut pairs,
                    &mut warnings,
                );
            }
        }

        Ok(RealizationPlan {
            movements,
            pairs,
            warnings,
        })
    }

    /// Plans the ledger effect of paying out a refund.
    ///
    /// The return already credited the receivable when it was approved; the
    /// payout debits it back and credits the money account of the chosen
    /// method. No stock moves.
    #[must_use]
    pub fn plan_refund<A>(
        method: PaymentMethod,
        amount: Decimal,
        reference: &str,
        account_of: A,
    ) -> RealizationPlan
    where
        A: Fn(WellKnownAccount) -> Option<AccountId>,
    {
        let mut pairs = Vec::new();
        let mut warnings = Vec::new();
        resolve_pair(
            &account_of,
            WellKnownAccount::AccountsReceivable,
            method.money_account(),
            round_money(amount),
            format!("Refund for {reference}"),
            &mut pairs,
            &mut warnings,
        );
        RealizationPlan {
            movements: Vec::new(),
            pairs,
            warnings,
        }
    }
}

/// Resolves one debit/credit pair, skipping it when the amount is zero or an
/// account is missing.
fn resolve_pair<A>(
    account_of: &A,
    debit: WellKnownAccount,
    credit: WellKnownAccount,
    amount: Decimal,
    description: String,
    pairs: &mut Vec<PostingPair>,
    warnings: &mut Vec<PostingWarning>,
) where
    A: Fn(WellKnownAccount) -> Option<AccountId>,
{
    if amount <= Decimal::ZERO {
        return;
    }
    match (account_of(debit), account_of(credit)) {
        (Some(debit_id), Some(credit_id)) => pairs.push(PostingPair {
            debit: debit_id,
            credit: credit_id,
            amount,
            description,
        }),
        (debit_id, credit_id) => {
            if debit_id.is_none() {
                warnings.push(PostingWarning::MissingAccount { account: debit });
            }
            if credit_id.is_none() {
                warnings.push(PostingWarning::MissingAccount { account: credit });
            }
        }
    }
}
