use chrono::NaiveDate;
use ledger_core::core::{
    AccountService, CategoryService, Confirmation, GoalService, TransactionDraft,
    TransactionService, TransferService,
};
use ledger_core::domain::CategoryKind;
use ledger_core::errors::LedgerError;
use ledger_core::ledger::{balance_as_of, Ledger};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(
    ledger: &mut Ledger,
    account: uuid::Uuid,
    category: uuid::Uuid,
    amount: f64,
    day: NaiveDate,
    description: &str,
) -> uuid::Uuid {
    TransactionService::create(
        ledger,
        TransactionDraft {
            account_id: account,
            date: day,
            amount,
            category_id: category,
            description: description.into(),
            settled: true,
            forecast: false,
            recurrence: None,
        },
        Confirmation::Unconfirmed,
    )
    .expect("create expense")
}

#[test]
fn opening_balance_and_expense_yield_expected_month_end_balance() {
    let mut ledger = Ledger::new("Household");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 1000.0).unwrap();
    let food = CategoryService::add(&mut ledger, "Food", CategoryKind::Expense).unwrap();
    expense(&mut ledger, account, food, 200.0, date(2024, 1, 15), "groceries");

    assert_eq!(
        balance_as_of(&ledger, account, Some(date(2024, 1, 31))),
        800.0
    );
    // The opening entry itself is a regular, settled transaction.
    assert_eq!(ledger.transactions_for_account(account).count(), 2);
}

#[test]
fn unsettled_and_future_transactions_do_not_move_the_balance() {
    let mut ledger = Ledger::new("Household");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 1000.0).unwrap();
    let food = CategoryService::add(&mut ledger, "Food", CategoryKind::Expense).unwrap();
    let pending = TransactionService::create(
        &mut ledger,
        TransactionDraft {
            account_id: account,
            date: date(2024, 1, 10),
            amount: 300.0,
            category_id: food,
            description: "pending".into(),
            settled: false,
            forecast: false,
            recurrence: None,
        },
        Confirmation::Unconfirmed,
    )
    .unwrap();
    expense(&mut ledger, account, food, 50.0, date(2024, 2, 5), "later");

    assert_eq!(
        balance_as_of(&ledger, account, Some(date(2024, 1, 31))),
        1000.0
    );

    TransactionService::settle(&mut ledger, pending).unwrap();
    assert_eq!(
        balance_as_of(&ledger, account, Some(date(2024, 1, 31))),
        700.0
    );
}

#[test]
fn transfer_moves_funds_and_deletes_as_a_unit() {
    let mut ledger = Ledger::new("Household");
    let a = AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 500.0).unwrap();
    let b = AccountService::create(&mut ledger, "Savings", date(2024, 1, 1), 0.0).unwrap();
    let (out_id, in_id) =
        TransferService::create(&mut ledger, a, b, 50.0, date(2024, 2, 1), "stash").unwrap();

    assert_eq!(balance_as_of(&ledger, a, None), 450.0);
    assert_eq!(balance_as_of(&ledger, b, None), 50.0);

    // Deleting one leg requires confirmation because it takes the pair along.
    let err = TransactionService::remove(&mut ledger, in_id, Confirmation::Unconfirmed)
        .expect_err("paired delete needs confirmation");
    assert!(matches!(err, LedgerError::Conflict(_)));

    TransactionService::remove(&mut ledger, in_id, Confirmation::Confirmed).unwrap();
    assert!(ledger.transaction(out_id).is_none());
    assert!(ledger.transaction(in_id).is_none());
    assert_eq!(balance_as_of(&ledger, a, None), 500.0);
    assert_eq!(balance_as_of(&ledger, b, None), 0.0);
}

#[test]
fn system_categories_survive_delete_attempts() {
    let mut ledger = Ledger::new("Household");
    for name in ["Transfer", "Opening Balance", "Card Payment"] {
        let id = ledger.system_category(name).unwrap().id;
        let err = CategoryService::remove(&mut ledger, id).expect_err("system category");
        assert!(matches!(err, LedgerError::InvariantViolation(_)));
    }
    assert_eq!(ledger.categories.len(), 3);
}

#[test]
fn account_with_history_cannot_be_silently_removed() {
    let mut ledger = Ledger::new("Household");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 100.0).unwrap();
    let food = CategoryService::add(&mut ledger, "Food", CategoryKind::Expense).unwrap();
    expense(&mut ledger, account, food, 10.0, date(2024, 1, 2), "snack");

    let err = AccountService::remove(&mut ledger, account, Confirmation::Confirmed)
        .expect_err("history blocks removal");
    assert!(matches!(err, LedgerError::InvariantViolation(_)));
    assert!(ledger.account(account).is_some());
}

#[test]
fn duplicate_entry_requires_confirmation_then_goes_through() {
    let mut ledger = Ledger::new("Household");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 100.0).unwrap();
    let food = CategoryService::add(&mut ledger, "Food", CategoryKind::Expense).unwrap();
    let draft = TransactionDraft {
        account_id: account,
        date: date(2024, 1, 5),
        amount: 12.5,
        category_id: food,
        description: "Lunch".into(),
        settled: true,
        forecast: false,
        recurrence: None,
    };
    TransactionService::create(&mut ledger, draft.clone(), Confirmation::Unconfirmed).unwrap();

    let err = TransactionService::create(&mut ledger, draft.clone(), Confirmation::Unconfirmed)
        .expect_err("same day, amount and description");
    assert!(matches!(err, LedgerError::Conflict(_)));

    TransactionService::create(&mut ledger, draft, Confirmation::Confirmed).unwrap();
    assert_eq!(ledger.transactions_for_account(account).count(), 3);
}

#[test]
fn goal_contribution_lifecycle_reports_shortfall() {
    let mut ledger = Ledger::new("Household");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 300.0).unwrap();
    let goal = GoalService::create(&mut ledger, "Trip", 1000.0, date(2025, 6, 1)).unwrap();

    let today = date(2024, 3, 1);
    let err = GoalService::contribute(&mut ledger, goal, account, 500.0, today, today)
        .expect_err("not enough funds");
    assert_eq!(err.shortfall(), Some(200.0));

    GoalService::contribute(&mut ledger, goal, account, 300.0, today, today).unwrap();
    assert_eq!(balance_as_of(&ledger, account, None), 0.0);
}
