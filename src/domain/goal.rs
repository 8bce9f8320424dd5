use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity};

/// A named savings target bound to a dedicated system Investment category.
///
/// The category is created together with the goal and deleted with it;
/// contributions are ordinary Investment transactions against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    pub target_date: NaiveDate,
    pub category_id: Uuid,
}

impl InvestmentGoal {
    pub fn new(
        name: impl Into<String>,
        target_amount: f64,
        target_date: NaiveDate,
        category_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            target_date,
            category_id,
        }
    }
}

impl Identifiable for InvestmentGoal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for InvestmentGoal {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for InvestmentGoal {
    fn display_label(&self) -> String {
        format!("{} (target {:.2})", self.name, self.target_amount)
    }
}
