//! Paired-leg transfers between two accounts.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    CategoryKind, LegDirection, Transaction, TransactionRole, TRANSFER_CATEGORY,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

use super::clean_description;

/// Partial update applied to both legs of a transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferPatch {
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub description: Option<String>,
}

pub struct TransferService;

impl TransferService {
    /// Creates both legs of a transfer in one call: an outflow on the
    /// source account and an inflow on the destination, mutually paired
    /// and both settled. Returns `(outflow_id, inflow_id)`.
    pub fn create(
        ledger: &mut Ledger,
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: f64,
        date: NaiveDate,
        description: &str,
    ) -> Result<(Uuid, Uuid)> {
        if source_account_id == destination_account_id {
            return Err(LedgerError::Validation(
                "source and destination accounts must differ".into(),
            ));
        }
        if amount < 0.0 {
            return Err(LedgerError::Validation(
                "amount must be a non-negative magnitude".into(),
            ));
        }
        if ledger.account(source_account_id).is_none() {
            return Err(LedgerError::NotFound("source account".into()));
        }
        if ledger.account(destination_account_id).is_none() {
            return Err(LedgerError::NotFound("destination account".into()));
        }
        let category_id = ledger.system_category(TRANSFER_CATEGORY)?.id;
        let description = clean_description(description);

        let out_id = Uuid::new_v4();
        let in_id = Uuid::new_v4();
        let mut outflow = Transaction::new(
            source_account_id,
            date,
            amount,
            category_id,
            CategoryKind::Transfer,
            description.clone(),
        )
        .settled()
        .with_role(TransactionRole::TransferLeg {
            pair_id: in_id,
            direction: LegDirection::Outflow,
        });
        outflow.id = out_id;

        let mut inflow = Transaction::new(
            destination_account_id,
            date,
            amount,
            category_id,
            CategoryKind::Transfer,
            description,
        )
        .settled()
        .with_role(TransactionRole::TransferLeg {
            pair_id: out_id,
            direction: LegDirection::Inflow,
        });
        inflow.id = in_id;

        ledger.add_transaction(outflow);
        ledger.add_transaction(inflow);
        tracing::debug!(outflow_id = %out_id, inflow_id = %in_id, "transfer created");
        Ok((out_id, in_id))
    }

    /// Rewrites both legs of a transfer given either leg's id. Each leg
    /// keeps its original direction; only accounts, date, amount, and
    /// description change.
    pub fn update(ledger: &mut Ledger, leg_id: Uuid, patch: TransferPatch) -> Result<()> {
        let (leg_direction, pair_id) = {
            let leg = ledger
                .transaction(leg_id)
                .ok_or_else(|| LedgerError::NotFound("transfer leg".into()))?;
            match &leg.role {
                TransactionRole::TransferLeg { pair_id, direction } => (*direction, *pair_id),
                _ => {
                    return Err(LedgerError::Validation(
                        "transaction is not a transfer leg".into(),
                    ))
                }
            }
        };
        if ledger.transaction(pair_id).is_none() {
            return Err(LedgerError::NotFound("paired transfer leg".into()));
        }
        if patch.amount.is_some_and(|amount| amount < 0.0) {
            return Err(LedgerError::Validation(
                "amount must be a non-negative magnitude".into(),
            ));
        }
        if let Some(account_id) = patch.source_account_id {
            if ledger.account(account_id).is_none() {
                return Err(LedgerError::NotFound("source account".into()));
            }
        }
        if let Some(account_id) = patch.destination_account_id {
            if ledger.account(account_id).is_none() {
                return Err(LedgerError::NotFound("destination account".into()));
            }
        }
        let (outflow_id, inflow_id) = match leg_direction {
            LegDirection::Outflow => (leg_id, pair_id),
            LegDirection::Inflow => (pair_id, leg_id),
        };

        // Compare effective accounts, not just the patched pair: redirecting
        // a single leg must not land both legs on the same account.
        let current_source = ledger
            .transaction(outflow_id)
            .map(|txn| txn.account_id)
            .ok_or_else(|| LedgerError::NotFound("transfer leg".into()))?;
        let current_destination = ledger
            .transaction(inflow_id)
            .map(|txn| txn.account_id)
            .ok_or_else(|| LedgerError::NotFound("transfer leg".into()))?;
        if patch.source_account_id.unwrap_or(current_source)
            == patch.destination_account_id.unwrap_or(current_destination)
        {
            return Err(LedgerError::Validation(
                "source and destination accounts must differ".into(),
            ));
        }

        let description = patch.description.as_deref().map(clean_description);
        for (id, account_change) in [
            (outflow_id, patch.source_account_id),
            (inflow_id, patch.destination_account_id),
        ] {
            let txn = ledger
                .transaction_mut(id)
                .ok_or_else(|| LedgerError::NotFound("transfer leg".into()))?;
            if let Some(account_id) = account_change {
                txn.account_id = account_id;
            }
            if let Some(date) = patch.date {
                txn.date = date;
            }
            if let Some(amount) = patch.amount {
                txn.amount = amount;
            }
            if let Some(description) = description.clone() {
                txn.description = description;
            }
        }
        ledger.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::AccountService;
    use crate::ledger::balance_as_of;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_accounts() -> (Ledger, Uuid, Uuid) {
        let mut ledger = Ledger::new("Transfers");
        let a = AccountService::create(&mut ledger, "A", date(2024, 1, 1), 500.0).unwrap();
        let b = AccountService::create(&mut ledger, "B", date(2024, 1, 1), 200.0).unwrap();
        (ledger, a, b)
    }

    #[test]
    fn legs_are_symmetric_and_mutually_paired() {
        let (mut ledger, a, b) = two_accounts();
        let (out_id, in_id) =
            TransferService::create(&mut ledger, a, b, 50.0, date(2024, 2, 1), "stash").unwrap();
        let outflow = ledger.transaction(out_id).unwrap();
        let inflow = ledger.transaction(in_id).unwrap();
        assert_eq!(outflow.pair_id(), Some(in_id));
        assert_eq!(inflow.pair_id(), Some(out_id));
        assert_eq!(outflow.amount, inflow.amount);
        assert_eq!(outflow.date, inflow.date);
        assert_eq!(outflow.description, inflow.description);
    }

    #[test]
    fn transfer_moves_balance_between_accounts() {
        let (mut ledger, a, b) = two_accounts();
        TransferService::create(&mut ledger, a, b, 50.0, date(2024, 2, 1), "stash").unwrap();
        assert_eq!(balance_as_of(&ledger, a, None), 450.0);
        assert_eq!(balance_as_of(&ledger, b, None), 250.0);
    }

    #[test]
    fn same_account_transfer_is_rejected() {
        let (mut ledger, a, _) = two_accounts();
        let err = TransferService::create(&mut ledger, a, a, 10.0, date(2024, 2, 1), "loop")
            .expect_err("same-account transfer must fail");
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn update_from_either_leg_rewrites_both() {
        let (mut ledger, a, b) = two_accounts();
        let (out_id, in_id) =
            TransferService::create(&mut ledger, a, b, 50.0, date(2024, 2, 1), "stash").unwrap();

        let patch = TransferPatch {
            amount: Some(75.0),
            date: Some(date(2024, 2, 2)),
            description: Some("bigger stash".into()),
            ..TransferPatch::default()
        };
        // Address the transfer through the inflow leg.
        TransferService::update(&mut ledger, in_id, patch).unwrap();

        let outflow = ledger.transaction(out_id).unwrap();
        let inflow = ledger.transaction(in_id).unwrap();
        assert_eq!(outflow.amount, 75.0);
        assert_eq!(inflow.amount, 75.0);
        assert_eq!(outflow.date, date(2024, 2, 2));
        assert_eq!(outflow.description, "bigger stash");
        assert_eq!(outflow.account_id, a);
        assert_eq!(inflow.account_id, b);
        assert_eq!(balance_as_of(&ledger, a, None), 425.0);
    }

    #[test]
    fn update_cannot_collapse_legs_onto_one_account() {
        let (mut ledger, a, b) = two_accounts();
        let (out_id, in_id) =
            TransferService::create(&mut ledger, a, b, 40.0, date(2024, 2, 1), "move").unwrap();

        // Redirecting only the source to the current destination must fail.
        let patch = TransferPatch {
            source_account_id: Some(b),
            ..TransferPatch::default()
        };
        let err = TransferService::update(&mut ledger, out_id, patch)
            .expect_err("both legs would share an account");
        assert!(matches!(err, LedgerError::Validation(_)));

        // Same for the destination, addressed through the inflow leg.
        let patch = TransferPatch {
            destination_account_id: Some(a),
            ..TransferPatch::default()
        };
        let err = TransferService::update(&mut ledger, in_id, patch)
            .expect_err("both legs would share an account");
        assert!(matches!(err, LedgerError::Validation(_)));

        assert_eq!(ledger.transaction(out_id).unwrap().account_id, a);
        assert_eq!(ledger.transaction(in_id).unwrap().account_id, b);
    }

    #[test]
    fn update_can_redirect_destination() {
        let (mut ledger, a, b) = two_accounts();
        let c = AccountService::create(&mut ledger, "C", date(2024, 1, 1), 0.0).unwrap();
        let (out_id, _) =
            TransferService::create(&mut ledger, a, b, 30.0, date(2024, 2, 1), "move").unwrap();
        let patch = TransferPatch {
            destination_account_id: Some(c),
            ..TransferPatch::default()
        };
        TransferService::update(&mut ledger, out_id, patch).unwrap();
        assert_eq!(balance_as_of(&ledger, b, None), 200.0);
        assert_eq!(balance_as_of(&ledger, c, None), 30.0);
    }
}
