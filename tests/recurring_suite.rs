use chrono::NaiveDate;
use ledger_core::core::{
    AccountService, CategoryService, Confirmation, RecurringService, TransactionDraft,
    TransactionService,
};
use ledger_core::domain::{CategoryKind, Frequency, RecurrenceRule};
use ledger_core::ledger::Ledger;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_series(ledger: &mut Ledger, start: NaiveDate, frequency: Frequency) -> uuid::Uuid {
    let account = AccountService::create(ledger, "Checking", date(2024, 1, 1), 10_000.0).unwrap();
    let category = CategoryService::add(ledger, "Rent", CategoryKind::Expense).unwrap();
    TransactionService::create(
        ledger,
        TransactionDraft {
            account_id: account,
            date: start,
            amount: 1500.0,
            category_id: category,
            description: "rent".into(),
            settled: true,
            forecast: false,
            recurrence: Some(RecurrenceRule::new(frequency)),
        },
        Confirmation::Unconfirmed,
    )
    .unwrap()
}

#[test]
fn month_end_series_clamps_to_shorter_months() {
    let mut ledger = Ledger::new("Recurring");
    seed_series(&mut ledger, date(2024, 1, 31), Frequency::Monthly);

    RecurringService::run(&mut ledger, date(2024, 4, 30)).unwrap();

    let mut dates: Vec<NaiveDate> = ledger
        .transactions
        .iter()
        .filter(|txn| txn.forecast)
        .map(|txn| txn.date)
        .collect();
    dates.sort();
    // 2024 is a leap year; the cursor clamps to Feb 29 and advances from there.
    assert_eq!(
        dates,
        vec![date(2024, 2, 29), date(2024, 3, 29), date(2024, 4, 29)]
    );
}

#[test]
fn catch_up_resumes_from_the_latest_instance() {
    let mut ledger = Ledger::new("Recurring");
    let template = seed_series(&mut ledger, date(2024, 1, 5), Frequency::Monthly);

    assert_eq!(
        RecurringService::run(&mut ledger, date(2024, 2, 10)).unwrap(),
        1
    );
    assert_eq!(
        RecurringService::run(&mut ledger, date(2024, 4, 10)).unwrap(),
        2
    );
    assert_eq!(
        RecurringService::run(&mut ledger, date(2024, 4, 10)).unwrap(),
        0
    );

    let group = ledger.transaction(template).unwrap().recurrence_group_id;
    assert!(group.is_some());
    let in_group = ledger
        .transactions
        .iter()
        .filter(|txn| txn.recurrence_group_id == group)
        .count();
    assert_eq!(in_group, 4);
}

#[test]
fn generated_instances_start_as_unsettled_forecasts() {
    let mut ledger = Ledger::new("Recurring");
    seed_series(&mut ledger, date(2024, 1, 5), Frequency::Weekly);

    RecurringService::run(&mut ledger, date(2024, 1, 26)).unwrap();
    let generated: Vec<_> = ledger
        .transactions
        .iter()
        .filter(|txn| txn.forecast)
        .collect();
    assert_eq!(generated.len(), 3);
    assert!(generated.iter().all(|txn| !txn.settled));
    assert!(generated.iter().all(|txn| txn.recurrence.is_none()));
}
