//! Credit-card management: cards, purchases, installment batches, and
//! cycle payments.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    CardAccount, CardPurchase, CategoryKind, Competency, Transaction, TransactionRole,
    CARD_PAYMENT_CATEGORY,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::billing::{cycle_summary, generate_installments, PAYMENT_TOLERANCE};
use crate::ledger::Ledger;

use super::clean_description;

pub struct CardService;

impl CardService {
    pub fn add_card(ledger: &mut Ledger, card: CardAccount) -> Result<Uuid> {
        Self::validate_card(&card)?;
        Ok(ledger.add_card(card))
    }

    pub fn update_card(ledger: &mut Ledger, id: Uuid, changes: CardAccount) -> Result<()> {
        Self::validate_card(&changes)?;
        let card = ledger
            .card_mut(id)
            .ok_or_else(|| LedgerError::NotFound("card".into()))?;
        card.nickname = changes.nickname;
        card.closing_day = changes.closing_day;
        card.due_day = changes.due_day;
        card.credit_limit = changes.credit_limit;
        card.default_account_id = changes.default_account_id;
        ledger.touch();
        Ok(())
    }

    pub fn remove_card(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        if ledger.card(id).is_none() {
            return Err(LedgerError::NotFound("card".into()));
        }
        if ledger.purchases.iter().any(|purchase| purchase.card_id == id) {
            return Err(LedgerError::InvariantViolation(
                "card still has purchases".into(),
            ));
        }
        ledger.cards.retain(|card| card.id != id);
        ledger.touch();
        Ok(())
    }

    /// Records a purchase and its full installment batch in one step.
    pub fn create_purchase(ledger: &mut Ledger, mut purchase: CardPurchase) -> Result<Uuid> {
        let card = ledger
            .card(purchase.card_id)
            .ok_or_else(|| LedgerError::NotFound("card".into()))?
            .clone();
        Self::validate_purchase(ledger, &purchase)?;
        purchase.description = clean_description(&purchase.description);

        let installments = generate_installments(&purchase, &card);
        let id = purchase.id;
        ledger.installments.extend(installments);
        ledger.add_purchase(purchase);
        tracing::debug!(purchase_id = %id, "card purchase created");
        Ok(id)
    }

    /// Rewrites a purchase and regenerates its installments wholesale.
    /// Count, split, and competencies can all change together, so a partial
    /// patch of the batch is never attempted.
    pub fn update_purchase(ledger: &mut Ledger, id: Uuid, mut changes: CardPurchase) -> Result<()> {
        if ledger.purchase(id).is_none() {
            return Err(LedgerError::NotFound("card purchase".into()));
        }
        let card = ledger
            .card(changes.card_id)
            .ok_or_else(|| LedgerError::NotFound("card".into()))?
            .clone();
        changes.id = id;
        Self::validate_purchase(ledger, &changes)?;
        changes.description = clean_description(&changes.description);

        let installments = generate_installments(&changes, &card);
        ledger
            .installments
            .retain(|installment| installment.purchase_id != id);
        ledger.installments.extend(installments);
        let slot = ledger
            .purchases
            .iter_mut()
            .find(|purchase| purchase.id == id)
            .ok_or_else(|| LedgerError::NotFound("card purchase".into()))?;
        *slot = changes;
        ledger.touch();
        Ok(())
    }

    /// Removes a purchase and cascades over its installments.
    pub fn remove_purchase(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        if ledger.purchase(id).is_none() {
            return Err(LedgerError::NotFound("card purchase".into()));
        }
        ledger
            .installments
            .retain(|installment| installment.purchase_id != id);
        ledger.purchases.retain(|purchase| purchase.id != id);
        ledger.touch();
        Ok(())
    }

    /// Pays (part of) a billing cycle from a bank account. The payment is a
    /// single settled card-payment transaction; overpaying the remaining
    /// balance is rejected with a cent of rounding tolerance.
    pub fn pay_cycle(
        ledger: &mut Ledger,
        card_id: Uuid,
        account_id: Uuid,
        amount: f64,
        date: NaiveDate,
        competency: Competency,
    ) -> Result<Uuid> {
        let card = ledger
            .card(card_id)
            .ok_or_else(|| LedgerError::NotFound("card".into()))?;
        if ledger.account(account_id).is_none() {
            return Err(LedgerError::NotFound("account".into()));
        }
        if amount <= 0.0 {
            return Err(LedgerError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        let summary = cycle_summary(ledger, card_id, competency);
        if amount > summary.remaining + PAYMENT_TOLERANCE {
            return Err(LedgerError::Validation(format!(
                "payment of {:.2} exceeds the remaining {:.2} for {}",
                amount, summary.remaining, competency
            )));
        }
        let category_id = ledger.system_category(CARD_PAYMENT_CATEGORY)?.id;
        let description = format!("{} {}", card.nickname, competency);

        let payment = Transaction::new(
            account_id,
            date,
            amount,
            category_id,
            CategoryKind::Transfer,
            description,
        )
        .settled()
        .with_role(TransactionRole::CardPayment {
            card_id,
            competency,
            pair_id: None,
        });
        let id = ledger.add_transaction(payment);
        tracing::debug!(payment_id = %id, %competency, "cycle payment recorded");
        Ok(id)
    }

    fn validate_card(card: &CardAccount) -> Result<()> {
        if card.nickname.trim().is_empty() {
            return Err(LedgerError::Validation("card nickname is required".into()));
        }
        if !(1..=31).contains(&card.closing_day) || !(1..=31).contains(&card.due_day) {
            return Err(LedgerError::Validation(
                "closing and due days must fall within 1-31".into(),
            ));
        }
        Ok(())
    }

    fn validate_purchase(ledger: &Ledger, purchase: &CardPurchase) -> Result<()> {
        if purchase.installment_count == 0 {
            return Err(LedgerError::Validation(
                "a purchase needs at least one installment".into(),
            ));
        }
        if purchase.total_amount < 0.0 {
            return Err(LedgerError::Validation(
                "amount must be a non-negative magnitude; use a reversal for credits".into(),
            ));
        }
        if ledger.category(purchase.category_id).is_none() {
            return Err(LedgerError::NotFound("category".into()));
        }
        Ok(())
    }
}
