use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A bank or cash account tracked by the ledger.
///
/// Balance is never stored here; it is always derived from the account's
/// settled transactions (see [`crate::ledger::balance`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub opened_on: NaiveDate,
}

impl Account {
    pub fn new(name: impl Into<String>, opened_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            opened_on,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} (opened {})", self.name, self.opened_on)
    }
}
