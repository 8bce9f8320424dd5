//! Guarded create/update/delete for ordinary transactions.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{CategoryKind, RecurrenceRule, Transaction, TransactionRole};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::money::to_cents;

use super::{clean_description, Confirmation};

/// Input for a new ordinary transaction. Kind and role are stamped by the
/// service; transfers, opening balances, and card payments have their own
/// entry points.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub category_id: Uuid,
    pub description: String,
    pub settled: bool,
    pub forecast: bool,
    pub recurrence: Option<RecurrenceRule>,
}

/// Partial update for an existing transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
}

pub struct TransactionService;

impl TransactionService {
    /// Finds an existing transaction that looks like a re-entry of `draft`:
    /// same account, date, and amount, with a case-insensitive description
    /// match. Exposed separately so callers can probe before prompting.
    pub fn find_duplicate(ledger: &Ledger, draft: &TransactionDraft) -> Option<Uuid> {
        let description = draft.description.trim().to_lowercase();
        ledger
            .transactions_for_account(draft.account_id)
            .find(|txn| {
                txn.date == draft.date
                    && to_cents(txn.amount) == to_cents(draft.amount)
                    && txn.description.trim().to_lowercase() == description
            })
            .map(|txn| txn.id)
    }

    pub fn create(
        ledger: &mut Ledger,
        draft: TransactionDraft,
        confirmation: Confirmation,
    ) -> Result<Uuid> {
        if ledger.account(draft.account_id).is_none() {
            return Err(LedgerError::NotFound("account".into()));
        }
        let category = ledger
            .category(draft.category_id)
            .ok_or_else(|| LedgerError::NotFound("category".into()))?;
        if draft.amount < 0.0 {
            return Err(LedgerError::Validation(
                "amount must be a non-negative magnitude".into(),
            ));
        }
        if category.kind == CategoryKind::Transfer {
            return Err(LedgerError::Validation(
                "transfer categories require the transfer operation".into(),
            ));
        }
        let kind = category.kind;
        if Self::find_duplicate(ledger, &draft).is_some() && !confirmation.granted() {
            return Err(LedgerError::Conflict(
                "a matching transaction already exists on this date".into(),
            ));
        }

        let mut txn = Transaction::new(
            draft.account_id,
            draft.date,
            draft.amount,
            draft.category_id,
            kind,
            clean_description(&draft.description),
        );
        txn.settled = draft.settled;
        txn.forecast = draft.forecast;
        if let Some(rule) = draft.recurrence {
            txn.recurrence = Some(rule);
            txn.recurrence_group_id = Some(Uuid::new_v4());
        }
        let id = ledger.add_transaction(txn);
        tracing::debug!(transaction_id = %id, "transaction created");
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: TransactionPatch) -> Result<()> {
        let (role, account_id, current_amount, current_date) = {
            let txn = ledger
                .transaction(id)
                .ok_or_else(|| LedgerError::NotFound("transaction".into()))?;
            (txn.role.clone(), txn.account_id, txn.amount, txn.date)
        };

        // Legs stay in lockstep only when both are rewritten together.
        if matches!(role, TransactionRole::TransferLeg { .. }) {
            return Err(LedgerError::Validation(
                "transfer legs are edited through the transfer operation".into(),
            ));
        }

        // Opening balances are locked once real history exists.
        if matches!(role, TransactionRole::OpeningBalance) {
            let changes_locked_fields = patch
                .amount
                .is_some_and(|amount| to_cents(amount) != to_cents(current_amount))
                || patch.date.is_some_and(|date| date != current_date);
            let has_others = ledger
                .transactions_for_account(account_id)
                .any(|txn| !txn.is_opening_balance());
            if changes_locked_fields && has_others {
                return Err(LedgerError::InvariantViolation(
                    "opening balance is locked once the account has transactions; \
                     use an adjustment transaction instead"
                        .into(),
                ));
            }
        }

        let new_kind = match patch.category_id {
            Some(category_id) => {
                let category = ledger
                    .category(category_id)
                    .ok_or_else(|| LedgerError::NotFound("category".into()))?;
                if category.kind == CategoryKind::Transfer
                    && matches!(role, TransactionRole::Normal)
                {
                    return Err(LedgerError::InvariantViolation(
                        "an ordinary transaction cannot become a transfer; \
                         create a transfer instead"
                            .into(),
                    ));
                }
                Some(category.kind)
            }
            None => None,
        };
        if patch.amount.is_some_and(|amount| amount < 0.0) {
            return Err(LedgerError::Validation(
                "amount must be a non-negative magnitude".into(),
            ));
        }

        let pair_id = ledger.transaction(id).and_then(|txn| txn.pair_id());

        {
            let txn = ledger
                .transaction_mut(id)
                .ok_or_else(|| LedgerError::NotFound("transaction".into()))?;
            if let Some(date) = patch.date {
                txn.date = date;
            }
            if let Some(amount) = patch.amount {
                txn.amount = amount;
            }
            if let Some(category_id) = patch.category_id {
                txn.category_id = category_id;
            }
            if let Some(kind) = new_kind {
                txn.kind = kind;
            }
            if let Some(description) = patch.description.as_deref() {
                txn.description = clean_description(description);
            }
        }

        // A card payment mirrored into an account keeps its mirror in step.
        if matches!(role, TransactionRole::CardPayment { .. }) {
            if let Some(pair_id) = pair_id {
                if let Some(pair) = ledger.transaction_mut(pair_id) {
                    if let Some(date) = patch.date {
                        pair.date = date;
                    }
                    if let Some(amount) = patch.amount {
                        pair.amount = amount;
                    }
                    if let Some(description) = patch.description.as_deref() {
                        pair.description = clean_description(description);
                    }
                }
            }
        }

        ledger.touch();
        Ok(())
    }

    /// One-directional settle: flips `settled` on and `forecast` off.
    /// Settling an already-settled transaction is a no-op; there is no
    /// unsettle operation.
    pub fn settle(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        let txn = ledger
            .transaction_mut(id)
            .ok_or_else(|| LedgerError::NotFound("transaction".into()))?;
        if txn.settled {
            return Ok(());
        }
        txn.settled = true;
        txn.forecast = false;
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid, confirmation: Confirmation) -> Result<()> {
        let (role, account_id) = {
            let txn = ledger
                .transaction(id)
                .ok_or_else(|| LedgerError::NotFound("transaction".into()))?;
            (txn.role.clone(), txn.account_id)
        };

        match role {
            TransactionRole::TransferLeg { pair_id, .. } => {
                if !confirmation.granted() {
                    return Err(LedgerError::Conflict(
                        "deleting a transfer removes both legs".into(),
                    ));
                }
                ledger.remove_transaction(id);
                ledger.remove_transaction(pair_id);
            }
            TransactionRole::OpeningBalance => {
                let has_others = ledger
                    .transactions_for_account(account_id)
                    .any(|txn| !txn.is_opening_balance());
                if has_others {
                    return Err(LedgerError::InvariantViolation(
                        "the opening balance cannot be deleted while the account \
                         has transactions"
                            .into(),
                    ));
                }
                ledger.remove_transaction(id);
            }
            TransactionRole::CardPayment { pair_id, .. } => {
                ledger.remove_transaction(id);
                if let Some(pair_id) = pair_id {
                    ledger.remove_transaction(pair_id);
                }
            }
            TransactionRole::Normal => {
                ledger.remove_transaction(id);
            }
        }
        tracing::debug!(transaction_id = %id, "transaction deleted");
        Ok(())
    }

    /// Deletes a batch of transactions, expanding the set with each
    /// member's transfer pair so no transfer is left with a dangling leg.
    pub fn remove_many(ledger: &mut Ledger, ids: &[Uuid]) -> usize {
        let mut doomed: HashSet<Uuid> = ids.iter().copied().collect();
        for id in ids {
            if let Some(pair_id) = ledger.transaction(*id).and_then(|txn| txn.pair_id()) {
                doomed.insert(pair_id);
            }
        }
        let before = ledger.transactions.len();
        ledger.transactions.retain(|txn| !doomed.contains(&txn.id));
        let removed = before - ledger.transactions.len();
        if removed > 0 {
            ledger.touch();
        }
        removed
    }

    /// Reassigns a batch of transactions to `category_id`, re-stamping the
    /// denormalized kind. Role guards are deliberately not re-applied here;
    /// the caller curates the selection.
    pub fn reassign_category(ledger: &mut Ledger, ids: &[Uuid], category_id: Uuid) -> Result<usize> {
        let kind = ledger
            .category(category_id)
            .ok_or_else(|| LedgerError::NotFound("category".into()))?
            .kind;
        let targets: HashSet<Uuid> = ids.iter().copied().collect();
        let mut changed = 0usize;
        for txn in ledger
            .transactions
            .iter_mut()
            .filter(|txn| targets.contains(&txn.id))
        {
            txn.category_id = category_id;
            txn.kind = kind;
            changed += 1;
        }
        if changed > 0 {
            ledger.touch();
        }
        Ok(changed)
    }
}
