//! Billing competency: the `YYYY-MM` cycle a card installment belongs to.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// A card billing cycle, identified by calendar year and month.
///
/// Serialized as a `"YYYY-MM"` string to match the wire format callers use
/// for month-scoped views.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(try_from = "String", into = "String")]
pub struct Competency {
    pub year: i32,
    pub month: u32,
}

impl Competency {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Assigns a purchase to its first billing cycle: purchases on or before
    /// the card's closing day bill in their own month, later ones roll into
    /// the following month.
    pub fn first_for_purchase(purchase_date: NaiveDate, closing_day: u32) -> Self {
        let competency = Self::from_date(purchase_date);
        if purchase_date.day() <= closing_day {
            competency
        } else {
            competency.plus_months(1)
        }
    }

    /// Pure calendar arithmetic with year rollover in both directions.
    pub fn plus_months(self, months: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }
}

impl fmt::Display for Competency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Competency {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::Validation(format!("invalid competency `{raw}`, expected YYYY-MM"));
        let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Competency::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Competency {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Competency> for String {
    fn from(value: Competency) -> Self {
        value.to_string()
    }
}
