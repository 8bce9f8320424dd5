//! Running ledger balance, derived on demand from the transaction set.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{CategoryKind, LegDirection, Transaction, TransactionRole};
use crate::ledger::Ledger;
use crate::money::{from_cents, to_cents};

/// Computes an account's balance as of `as_of` (inclusive), or over the
/// whole history when `as_of` is `None`.
///
/// Only settled transactions count. The fold is pure and O(n) over the
/// account's transactions; the accumulator runs in integer cents so the
/// result never drifts from the cent-exact amounts the engine writes.
pub fn balance_as_of(ledger: &Ledger, account_id: Uuid, as_of: Option<NaiveDate>) -> f64 {
    let cents = ledger
        .transactions_for_account(account_id)
        .filter(|txn| txn.settled)
        .filter(|txn| as_of.map_or(true, |cutoff| txn.date <= cutoff))
        .map(|txn| to_cents(signed_amount(txn)))
        .sum();
    from_cents(cents)
}

/// Signed contribution of one transaction to its account's balance.
///
/// Income and reversals add; expenses and investments subtract. Transfer
/// kind branches on the role: opening balances add, card payments subtract,
/// and a transfer leg follows its explicit direction.
pub fn signed_amount(txn: &Transaction) -> f64 {
    match txn.kind {
        CategoryKind::Income | CategoryKind::Reversal => txn.amount,
        CategoryKind::Expense | CategoryKind::Investment => -txn.amount,
        CategoryKind::Transfer => match &txn.role {
            TransactionRole::OpeningBalance => txn.amount,
            TransactionRole::CardPayment { .. } => -txn.amount,
            TransactionRole::TransferLeg { direction, .. } => match direction {
                LegDirection::Outflow => -txn.amount,
                LegDirection::Inflow => txn.amount,
            },
            // A Transfer-kind transaction without a linking role should not
            // exist; count it as an inflow rather than guessing a pair.
            TransactionRole::Normal => txn.amount,
        },
    }
}
