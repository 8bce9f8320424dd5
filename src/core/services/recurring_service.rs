use chrono::NaiveDate;

use crate::errors::Result;
use crate::ledger::{generate_due_instances, Ledger};

pub struct RecurringService;

impl RecurringService {
    /// Catches every recurring series up to `today` and appends the new
    /// instances to the ledger. Safe to call repeatedly; the once-per-day
    /// gate lives with the caller's scheduler, not here.
    pub fn run(ledger: &mut Ledger, today: NaiveDate) -> Result<usize> {
        let generated = generate_due_instances(&ledger.transactions, today);
        let count = generated.len();
        for instance in generated {
            ledger.add_transaction(instance);
        }
        if count > 0 {
            tracing::info!(count, %today, "generated recurring transaction instances");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{
        AccountService, CategoryService, Confirmation, TransactionDraft, TransactionService,
    };
    use crate::domain::{CategoryKind, Frequency, RecurrenceRule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn run_is_idempotent_at_the_same_reference_date() {
        let mut ledger = Ledger::new("Recurring");
        let account =
            AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 100.0).unwrap();
        let category = CategoryService::add(&mut ledger, "Rent", CategoryKind::Expense).unwrap();
        TransactionService::create(
            &mut ledger,
            TransactionDraft {
                account_id: account,
                date: date(2024, 1, 5),
                amount: 1200.0,
                category_id: category,
                description: "rent".into(),
                settled: true,
                forecast: false,
                recurrence: Some(RecurrenceRule::new(Frequency::Monthly)),
            },
            Confirmation::Unconfirmed,
        )
        .unwrap();

        let today = date(2024, 3, 20);
        let first = RecurringService::run(&mut ledger, today).unwrap();
        assert_eq!(first, 2);
        let second = RecurringService::run(&mut ledger, today).unwrap();
        assert_eq!(second, 0);

        let generated: Vec<_> = ledger
            .transactions
            .iter()
            .filter(|txn| txn.forecast)
            .collect();
        assert_eq!(generated.len(), 2);
        assert!(generated.iter().all(|txn| !txn.settled));
    }
}
