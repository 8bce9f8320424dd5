//! Credit-card entities: the card itself, purchases, and their installments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity};
use crate::domain::competency::Competency;

/// A credit card with its billing cycle anchors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardAccount {
    pub id: Uuid,
    pub nickname: String,
    /// Day of month on which the billing cycle closes.
    pub closing_day: u32,
    /// Day of month the closed cycle is due.
    pub due_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    /// Account bills are usually paid from, used as a form default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account_id: Option<Uuid>,
}

impl CardAccount {
    pub fn new(nickname: impl Into<String>, closing_day: u32, due_day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            closing_day,
            due_day,
            credit_limit: None,
            default_account_id: None,
        }
    }
}

impl Identifiable for CardAccount {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for CardAccount {
    fn name(&self) -> &str {
        &self.nickname
    }
}

impl Displayable for CardAccount {
    fn display_label(&self) -> String {
        format!("{} (closes day {})", self.nickname, self.closing_day)
    }
}

/// A purchase made on a card, possibly split over several installments.
///
/// Reversals (refunds, chargebacks) are ordinary purchases with
/// `is_reversal` set; their installments carry negative amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardPurchase {
    pub id: Uuid,
    pub card_id: Uuid,
    pub purchase_date: NaiveDate,
    pub total_amount: f64,
    pub installment_count: u32,
    pub category_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub is_reversal: bool,
}

impl CardPurchase {
    pub fn new(
        card_id: Uuid,
        purchase_date: NaiveDate,
        total_amount: f64,
        installment_count: u32,
        category_id: Uuid,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            purchase_date,
            total_amount,
            installment_count,
            category_id,
            description: description.into(),
            is_reversal: false,
        }
    }

    pub fn reversal(mut self) -> Self {
        self.is_reversal = true;
        self
    }
}

impl Identifiable for CardPurchase {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// One slice of a purchase, assigned to a billing competency.
///
/// Installments are always created and replaced as a full batch owned by
/// their purchase; they are never patched individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardInstallment {
    pub id: Uuid,
    pub purchase_id: Uuid,
    /// 1-based position within the purchase.
    pub number: u32,
    pub amount: f64,
    pub competency: Competency,
}

impl Identifiable for CardInstallment {
    fn id(&self) -> Uuid {
        self.id
    }
}
