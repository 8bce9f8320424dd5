use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category::CategoryKind;
use crate::domain::common::{Displayable, Identifiable};
use crate::domain::competency::Competency;

/// The central ledger record.
///
/// `amount` is a non-negative magnitude; direction is derived from `kind`
/// plus `role`, never from the sign. `settled` means the transaction counts
/// toward the balance now, `forecast` marks a predicted future event; the
/// two are tracked independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub category_id: Uuid,
    /// Denormalized copy of the category's kind, re-stamped on every edit.
    pub kind: CategoryKind,
    pub description: String,
    pub settled: bool,
    pub forecast: bool,
    #[serde(default)]
    pub role: TransactionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_group_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        amount: f64,
        category_id: Uuid,
        kind: CategoryKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            amount,
            category_id,
            kind,
            description: description.into(),
            settled: false,
            forecast: false,
            role: TransactionRole::Normal,
            recurrence: None,
            recurrence_group_id: None,
        }
    }

    pub fn settled(mut self) -> Self {
        self.settled = true;
        self.forecast = false;
        self
    }

    pub fn with_role(mut self, role: TransactionRole) -> Self {
        self.role = role;
        self
    }

    /// Identifier of the mirrored record, for roles that carry one.
    pub fn pair_id(&self) -> Option<Uuid> {
        match &self.role {
            TransactionRole::TransferLeg { pair_id, .. } => Some(*pair_id),
            TransactionRole::CardPayment { pair_id, .. } => *pair_id,
            _ => None,
        }
    }

    pub fn is_transfer_leg(&self) -> bool {
        matches!(self.role, TransactionRole::TransferLeg { .. })
    }

    pub fn is_opening_balance(&self) -> bool {
        matches!(self.role, TransactionRole::OpeningBalance)
    }

    pub fn is_card_payment(&self) -> bool {
        matches!(self.role, TransactionRole::CardPayment { .. })
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {} ({})", self.date, self.description, self.kind)
    }
}

/// Mutually exclusive classification fixed at creation time.
///
/// Modeled as a tagged union so each role carries exactly the linkage it
/// needs: a transfer leg always knows its pair and direction, a card payment
/// always knows its card and competency. Invalid flag combinations cannot
/// be constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TransactionRole {
    #[default]
    Normal,
    TransferLeg {
        pair_id: Uuid,
        direction: LegDirection,
    },
    OpeningBalance,
    CardPayment {
        card_id: Uuid,
        competency: Competency,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pair_id: Option<Uuid>,
    },
}

/// Which side of a transfer a leg represents. Set explicitly at creation,
/// so pairing direction never depends on id ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegDirection {
    Outflow,
    Inflow,
}

impl LegDirection {
    pub fn opposite(self) -> Self {
        match self {
            LegDirection::Outflow => LegDirection::Inflow,
            LegDirection::Inflow => LegDirection::Outflow,
        }
    }
}

/// Recurrence rule carried only by the template instance of a series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        Self { frequency }
    }
}

/// Date-advance rules for recurring transactions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Advances a cursor date one step.
    ///
    /// Monthly steps clamp to the last day of the target month, so a series
    /// anchored on the 31st lands on Feb 29/28 instead of overflowing into
    /// March. Yearly steps clamp Feb 29 to Feb 28 on non-leap years.
    pub fn next_date(self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::days(7),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Yearly => shift_year(from, 1),
        }
    }
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).expect("clamped day is valid")
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).expect("clamped day is valid")
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid month start");
    (first_next - Duration::days(1)).day()
}
