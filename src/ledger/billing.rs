//! Credit-card billing: installment generation and cycle aggregation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CardAccount, CardInstallment, CardPurchase, Competency, TransactionRole};
use crate::ledger::Ledger;
use crate::money::{from_cents, split_installments, to_cents};

/// Cent tolerance applied when deciding whether a cycle is paid off, and
/// when validating a payment amount against the remaining balance.
pub const PAYMENT_TOLERANCE: f64 = 0.01;

/// Builds the full installment batch for a purchase.
///
/// The signed total (negated for reversals) is split cent-exactly; the
/// first competency comes from the purchase date and the card's closing
/// day, and each subsequent installment bills one month later. Callers
/// replace a purchase's installments with the returned batch wholesale;
/// partial patches would let count, split, and competencies drift apart.
pub fn generate_installments(purchase: &CardPurchase, card: &CardAccount) -> Vec<CardInstallment> {
    let signed_total = if purchase.is_reversal {
        -purchase.total_amount
    } else {
        purchase.total_amount
    };
    let parts = split_installments(signed_total, purchase.installment_count);
    let first = Competency::first_for_purchase(purchase.purchase_date, card.closing_day);

    parts
        .into_iter()
        .enumerate()
        .map(|(i, amount)| CardInstallment {
            id: Uuid::new_v4(),
            purchase_id: purchase.id,
            number: i as u32 + 1,
            amount,
            competency: first.plus_months(i as i32),
        })
        .collect()
}

/// Aggregated view of one card's billing cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleSummary {
    pub card_id: Uuid,
    pub competency: Competency,
    pub total: f64,
    pub paid: f64,
    pub remaining: f64,
    pub status: CycleStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleStatus {
    Open,
    Partial,
    Paid,
}

/// Sums a cycle's installments and payments for one card.
///
/// Reversal purchases already carry negative installment amounts, so they
/// simply reduce the total here. Payments are the card-payment
/// transactions stamped with this card and competency.
pub fn cycle_summary(ledger: &Ledger, card_id: Uuid, competency: Competency) -> CycleSummary {
    let total_cents: i64 = ledger
        .installments
        .iter()
        .filter(|installment| installment.competency == competency)
        .filter(|installment| {
            ledger
                .purchase(installment.purchase_id)
                .map_or(false, |purchase| purchase.card_id == card_id)
        })
        .map(|installment| to_cents(installment.amount))
        .sum();

    let paid_cents: i64 = ledger
        .transactions
        .iter()
        .filter(|txn| {
            matches!(
                &txn.role,
                TransactionRole::CardPayment {
                    card_id: paid_card,
                    competency: paid_competency,
                    ..
                } if *paid_card == card_id && *paid_competency == competency
            )
        })
        .map(|txn| to_cents(txn.amount))
        .sum();

    let total = from_cents(total_cents);
    let paid = from_cents(paid_cents);
    let remaining = from_cents(total_cents - paid_cents);
    let status = if total > 0.0 && remaining <= PAYMENT_TOLERANCE {
        CycleStatus::Paid
    } else if paid > 0.0 {
        CycleStatus::Partial
    } else {
        CycleStatus::Open
    };

    CycleSummary {
        card_id,
        competency,
        total,
        paid,
        remaining,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card() -> CardAccount {
        CardAccount::new("Gold", 20, 5)
    }

    #[test]
    fn installments_start_in_competency_of_purchase_month() {
        let card = card();
        let purchase = CardPurchase::new(card.id, date(2024, 3, 10), 100.0, 3, Uuid::new_v4(), "tv");
        let installments = generate_installments(&purchase, &card);
        assert_eq!(installments.len(), 3);
        assert_eq!(installments[0].competency.to_string(), "2024-03");
        assert_eq!(installments[2].competency.to_string(), "2024-05");
        assert_eq!(installments[0].number, 1);
        assert_eq!(installments[0].amount, 33.34);
        assert_eq!(installments[1].amount, 33.33);
    }

    #[test]
    fn purchase_after_closing_day_bills_next_month() {
        let card = card();
        let purchase =
            CardPurchase::new(card.id, date(2024, 3, 25), 60.0, 1, Uuid::new_v4(), "dinner");
        let installments = generate_installments(&purchase, &card);
        assert_eq!(installments[0].competency.to_string(), "2024-04");
    }

    #[test]
    fn reversal_installments_are_negative() {
        let card = card();
        let purchase = CardPurchase::new(card.id, date(2024, 3, 1), 90.0, 3, Uuid::new_v4(), "refund")
            .reversal();
        let installments = generate_installments(&purchase, &card);
        let sum: i64 = installments.iter().map(|i| to_cents(i.amount)).sum();
        assert_eq!(sum, -9000);
    }

    #[test]
    fn cycle_summary_tracks_partial_payment() {
        let mut ledger = Ledger::new("Cycles");
        let card = card();
        let card_id = ledger.add_card(card.clone());
        let purchase =
            CardPurchase::new(card_id, date(2024, 3, 10), 300.0, 1, Uuid::new_v4(), "sofa");
        for installment in generate_installments(&purchase, &card) {
            ledger.installments.push(installment);
        }
        ledger.add_purchase(purchase);

        let competency = Competency::new(2024, 3).unwrap();
        let open = cycle_summary(&ledger, card_id, competency);
        assert_eq!(open.total, 300.0);
        assert_eq!(open.status, CycleStatus::Open);

        let payment_category = ledger.system_category("Card Payment").unwrap().id;
        let payment = crate::domain::Transaction::new(
            Uuid::new_v4(),
            date(2024, 4, 5),
            120.0,
            payment_category,
            crate::domain::CategoryKind::Transfer,
            "partial bill",
        )
        .settled()
        .with_role(TransactionRole::CardPayment {
            card_id,
            competency,
            pair_id: None,
        });
        ledger.add_transaction(payment);

        let partial = cycle_summary(&ledger, card_id, competency);
        assert_eq!(partial.paid, 120.0);
        assert_eq!(partial.remaining, 180.0);
        assert_eq!(partial.status, CycleStatus::Partial);
    }
}
