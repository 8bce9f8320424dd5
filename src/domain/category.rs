//! Domain types representing transaction categories.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Name of the reserved category backing transfer legs.
pub const TRANSFER_CATEGORY: &str = "Transfer";
/// Name of the reserved category backing opening-balance transactions.
pub const OPENING_BALANCE_CATEGORY: &str = "Opening Balance";
/// Name of the reserved category backing credit-card bill payments.
pub const CARD_PAYMENT_CATEGORY: &str = "Card Payment";

/// Prefix applied to the dedicated category of an investment goal.
pub const GOAL_CATEGORY_PREFIX: &str = "Goal: ";

/// Categorises ledger activity for budgeting and reporting.
///
/// System categories (`is_system`) are seeded once per ledger and are
/// immutable: they can never be renamed, re-kinded, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub is_system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            is_system: false,
            monthly_budget: None,
        }
    }

    /// Creates a protected system category.
    pub fn system(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            is_system: true,
            ..Self::new(name, kind)
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

/// Supported category kinds. A transaction's direction in the balance fold
/// is derived from its kind, never from the sign of its amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
    Investment,
    Transfer,
    Reversal,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
            CategoryKind::Investment => "Investment",
            CategoryKind::Transfer => "Transfer",
            CategoryKind::Reversal => "Reversal",
        };
        f.write_str(label)
    }
}
