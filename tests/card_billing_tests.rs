use chrono::NaiveDate;
use ledger_core::core::{AccountService, CardService, CategoryService};
use ledger_core::domain::{CardAccount, CardPurchase, CategoryKind, Competency};
use ledger_core::ledger::{balance_as_of, cycle_summary, CycleStatus, Ledger};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture() -> (Ledger, uuid::Uuid, uuid::Uuid, uuid::Uuid) {
    let mut ledger = Ledger::new("Cards");
    let account =
        AccountService::create(&mut ledger, "Checking", date(2024, 1, 1), 2000.0).unwrap();
    // Closes on the 20th, due on the 5th of the following month.
    let card = CardService::add_card(&mut ledger, CardAccount::new("Gold", 20, 5)).unwrap();
    let category = CategoryService::add(&mut ledger, "Shopping", CategoryKind::Expense).unwrap();
    (ledger, account, card, category)
}

#[test]
fn installment_split_preserves_the_total_to_the_cent() {
    let (mut ledger, _, card, category) = fixture();
    let purchase = CardPurchase::new(card, date(2024, 3, 10), 100.0, 3, category, "blender");
    let id = CardService::create_purchase(&mut ledger, purchase).unwrap();

    let amounts: Vec<f64> = ledger
        .installments_for_purchase(id)
        .map(|installment| installment.amount)
        .collect();
    assert_eq!(amounts, vec![33.34, 33.33, 33.33]);
}

#[test]
fn purchase_day_relative_to_closing_day_picks_the_cycle() {
    let (mut ledger, _, card, category) = fixture();
    let on_closing =
        CardPurchase::new(card, date(2024, 3, 20), 60.0, 1, category, "on closing day");
    let after_closing =
        CardPurchase::new(card, date(2024, 3, 21), 80.0, 1, category, "day after");
    let first = CardService::create_purchase(&mut ledger, on_closing).unwrap();
    let second = CardService::create_purchase(&mut ledger, after_closing).unwrap();

    let march = Competency::new(2024, 3).unwrap();
    let april = Competency::new(2024, 4).unwrap();
    assert_eq!(
        ledger
            .installments_for_purchase(first)
            .next()
            .unwrap()
            .competency,
        march
    );
    assert_eq!(
        ledger
            .installments_for_purchase(second)
            .next()
            .unwrap()
            .competency,
        april
    );
}

#[test]
fn multi_month_installments_land_in_consecutive_competencies() {
    let (mut ledger, _, card, category) = fixture();
    let purchase = CardPurchase::new(card, date(2024, 11, 25), 300.0, 3, category, "gifts");
    let id = CardService::create_purchase(&mut ledger, purchase).unwrap();

    let competencies: Vec<String> = ledger
        .installments_for_purchase(id)
        .map(|installment| installment.competency.to_string())
        .collect();
    assert_eq!(competencies, vec!["2024-12", "2025-01", "2025-02"]);
}

#[test]
fn cycle_walks_from_open_through_partial_to_paid() {
    let (mut ledger, account, card, category) = fixture();
    let purchase = CardPurchase::new(card, date(2024, 3, 10), 500.0, 1, category, "fridge");
    CardService::create_purchase(&mut ledger, purchase).unwrap();
    let competency = Competency::new(2024, 3).unwrap();

    let summary = cycle_summary(&ledger, card, competency);
    assert_eq!(summary.status, CycleStatus::Open);
    assert_eq!(summary.total, 500.0);

    CardService::pay_cycle(&mut ledger, card, account, 200.0, date(2024, 4, 5), competency)
        .unwrap();
    let summary = cycle_summary(&ledger, card, competency);
    assert_eq!(summary.status, CycleStatus::Partial);
    assert_eq!(summary.remaining, 300.0);

    CardService::pay_cycle(&mut ledger, card, account, 300.0, date(2024, 4, 6), competency)
        .unwrap();
    let summary = cycle_summary(&ledger, card, competency);
    assert_eq!(summary.status, CycleStatus::Paid);
    assert_eq!(summary.remaining, 0.0);
    assert_eq!(balance_as_of(&ledger, account, None), 1500.0);
}

#[test]
fn reversal_offsets_the_cycle_it_lands_in() {
    let (mut ledger, _, card, category) = fixture();
    CardService::create_purchase(
        &mut ledger,
        CardPurchase::new(card, date(2024, 3, 10), 90.0, 3, category, "keyboard"),
    )
    .unwrap();
    CardService::create_purchase(
        &mut ledger,
        CardPurchase::new(card, date(2024, 3, 12), 90.0, 3, category, "keyboard refund")
            .reversal(),
    )
    .unwrap();

    for month in [3, 4, 5] {
        let summary = cycle_summary(&ledger, card, Competency::new(2024, month).unwrap());
        assert_eq!(summary.total, 0.0, "month {month} should net to zero");
    }
}
