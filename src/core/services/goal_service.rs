//! Investment goals and their dedicated categories.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryKind, InvestmentGoal, Transaction, GOAL_CATEGORY_PREFIX,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::{balance_as_of, Ledger};

use super::{clean_description, Confirmation};

pub struct GoalService;

impl GoalService {
    /// Creates a goal together with its dedicated system Investment
    /// category, named by the "Goal: X" convention.
    pub fn create(
        ledger: &mut Ledger,
        name: &str,
        target_amount: f64,
        target_date: NaiveDate,
    ) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("goal name is required".into()));
        }
        if target_amount <= 0.0 {
            return Err(LedgerError::Validation(
                "target amount must be positive".into(),
            ));
        }
        let category = Category::system(
            format!("{GOAL_CATEGORY_PREFIX}{name}"),
            CategoryKind::Investment,
        );
        let category_id = category.id;
        let goal = InvestmentGoal::new(name, target_amount, target_date, category_id);
        let goal_id = goal.id;
        ledger.add_category(category);
        ledger.add_goal(goal);
        tracing::debug!(%goal_id, "investment goal created");
        Ok(goal_id)
    }

    /// Moves money toward the goal: a settled Investment transaction on the
    /// source account, rejected when the account's balance as of `today`
    /// cannot cover it.
    pub fn contribute(
        ledger: &mut Ledger,
        goal_id: Uuid,
        account_id: Uuid,
        amount: f64,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Uuid> {
        let category_id = ledger
            .goal(goal_id)
            .ok_or_else(|| LedgerError::NotFound("goal".into()))?
            .category_id;
        if ledger.account(account_id).is_none() {
            return Err(LedgerError::NotFound("account".into()));
        }
        if amount <= 0.0 {
            return Err(LedgerError::Validation(
                "contribution must be positive".into(),
            ));
        }
        let available = balance_as_of(ledger, account_id, Some(today));
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        let goal_name = ledger
            .goal(goal_id)
            .map(|goal| goal.name.clone())
            .unwrap_or_default();
        let contribution = Transaction::new(
            account_id,
            date,
            amount,
            category_id,
            CategoryKind::Investment,
            clean_description(&format!("Contribution to {goal_name}")),
        )
        .settled();
        let id = ledger.add_transaction(contribution);
        tracing::debug!(%goal_id, contribution_id = %id, "goal contribution recorded");
        Ok(id)
    }

    /// Renames a goal and keeps its dedicated category on the naming
    /// convention.
    pub fn rename(ledger: &mut Ledger, goal_id: Uuid, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(LedgerError::Validation("goal name is required".into()));
        }
        let category_id = {
            let goal = ledger
                .goal(goal_id)
                .ok_or_else(|| LedgerError::NotFound("goal".into()))?;
            if goal.name == new_name {
                return Ok(());
            }
            goal.category_id
        };
        if let Some(category) = ledger.category_mut(category_id) {
            category.name = format!("{GOAL_CATEGORY_PREFIX}{new_name}");
        }
        let goal = ledger
            .goal_mut(goal_id)
            .ok_or_else(|| LedgerError::NotFound("goal".into()))?;
        goal.name = new_name.to_string();
        ledger.touch();
        Ok(())
    }

    /// Deletes a goal and its dedicated category, but only while no
    /// transaction references that category.
    pub fn remove(ledger: &mut Ledger, goal_id: Uuid, confirmation: Confirmation) -> Result<()> {
        let category_id = ledger
            .goal(goal_id)
            .ok_or_else(|| LedgerError::NotFound("goal".into()))?
            .category_id;
        if ledger
            .transactions
            .iter()
            .any(|txn| txn.category_id == category_id)
        {
            return Err(LedgerError::InvariantViolation(
                "goal has contributions; delete them first".into(),
            ));
        }
        if !confirmation.granted() {
            return Err(LedgerError::Conflict(
                "deleting the goal also removes its category".into(),
            ));
        }
        ledger.goals.retain(|goal| goal.id != goal_id);
        ledger.categories.retain(|category| category.id != category_id);
        ledger.touch();
        Ok(())
    }
}
