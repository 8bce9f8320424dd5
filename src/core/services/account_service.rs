use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Account, CategoryKind, Transaction, TransactionRole, OPENING_BALANCE_CATEGORY};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

use super::Confirmation;

/// Partial update applied to an account and its opening balance.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub opening_amount: Option<f64>,
    pub opening_date: Option<NaiveDate>,
}

pub struct AccountService;

impl AccountService {
    /// Creates an account together with its synthetic opening-balance
    /// transaction. Both records land in the same call, so the caller never
    /// observes one without the other.
    pub fn create(
        ledger: &mut Ledger,
        name: &str,
        opened_on: NaiveDate,
        opening_amount: f64,
    ) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("account name is required".into()));
        }
        if opening_amount < 0.0 {
            return Err(LedgerError::Validation(
                "opening balance must not be negative".into(),
            ));
        }
        Self::validate_name(ledger, None, name)?;
        let opening_category = ledger.system_category(OPENING_BALANCE_CATEGORY)?.id;

        let account = Account::new(name, opened_on);
        let account_id = account.id;
        let opening = Transaction::new(
            account_id,
            opened_on,
            opening_amount,
            opening_category,
            CategoryKind::Transfer,
            OPENING_BALANCE_CATEGORY,
        )
        .settled()
        .with_role(TransactionRole::OpeningBalance);

        ledger.add_account(account);
        ledger.add_transaction(opening);
        tracing::debug!(%account_id, "account created");
        Ok(account_id)
    }

    /// Applies a patch to the account and, when requested, to its opening
    /// balance. Once the account has any other transaction the opening
    /// amount and date are locked; history must be corrected with an
    /// adjustment transaction instead.
    pub fn update(ledger: &mut Ledger, id: Uuid, patch: AccountPatch) -> Result<()> {
        if ledger.account(id).is_none() {
            return Err(LedgerError::NotFound("account".into()));
        }
        if let Some(name) = patch.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::Validation("account name is required".into()));
            }
            Self::validate_name(ledger, Some(id), name)?;
        }

        let opening_id = Self::opening_transaction(ledger, id).map(|txn| txn.id);
        let changes_opening = {
            let opening = opening_id.and_then(|txn_id| ledger.transaction(txn_id));
            match opening {
                Some(opening) => {
                    patch
                        .opening_amount
                        .is_some_and(|amount| amount != opening.amount)
                        || patch.opening_date.is_some_and(|date| date != opening.date)
                }
                None => patch.opening_amount.is_some() || patch.opening_date.is_some(),
            }
        };
        if changes_opening && Self::has_other_transactions(ledger, id) {
            return Err(LedgerError::InvariantViolation(
                "opening balance is locked once the account has transactions; \
                 use an adjustment transaction instead"
                    .into(),
            ));
        }

        if let Some(txn_id) = opening_id {
            if changes_opening {
                let opening = ledger
                    .transaction_mut(txn_id)
                    .ok_or_else(|| LedgerError::NotFound("opening-balance transaction".into()))?;
                if let Some(amount) = patch.opening_amount {
                    opening.amount = amount;
                }
                if let Some(date) = patch.opening_date {
                    opening.date = date;
                }
            }
        }

        let account = ledger
            .account_mut(id)
            .ok_or_else(|| LedgerError::NotFound("account".into()))?;
        if let Some(name) = patch.name {
            account.name = name.trim().to_string();
        }
        if let Some(active) = patch.active {
            account.active = active;
        }
        if let Some(date) = patch.opening_date {
            account.opened_on = date;
        }
        ledger.touch();
        Ok(())
    }

    /// Deletes an account and its opening-balance transaction. Rejected
    /// while any other transaction still references the account.
    pub fn remove(ledger: &mut Ledger, id: Uuid, confirmation: Confirmation) -> Result<()> {
        if ledger.account(id).is_none() {
            return Err(LedgerError::NotFound("account".into()));
        }
        if Self::has_other_transactions(ledger, id) {
            return Err(LedgerError::InvariantViolation(
                "account still has transactions; delete or move them first".into(),
            ));
        }
        if !confirmation.granted() {
            return Err(LedgerError::Conflict(
                "deleting the account also removes its opening balance".into(),
            ));
        }
        ledger.transactions.retain(|txn| txn.account_id != id);
        ledger.accounts.retain(|account| account.id != id);
        ledger.touch();
        tracing::debug!(account_id = %id, "account deleted");
        Ok(())
    }

    /// The synthetic transaction created alongside the account, if present.
    pub fn opening_transaction(ledger: &Ledger, account_id: Uuid) -> Option<&Transaction> {
        ledger
            .transactions_for_account(account_id)
            .find(|txn| txn.is_opening_balance())
    }

    fn has_other_transactions(ledger: &Ledger, account_id: Uuid) -> bool {
        ledger
            .transactions_for_account(account_id)
            .any(|txn| !txn.is_opening_balance())
    }

    fn validate_name(ledger: &Ledger, exclude: Option<Uuid>, candidate: &str) -> Result<()> {
        let normalized = candidate.trim().to_lowercase();
        let duplicate = ledger.accounts.iter().any(|account| {
            account.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| account.id != id)
        });
        if duplicate {
            Err(LedgerError::Conflict(format!(
                "account `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
