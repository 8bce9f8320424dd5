use uuid::Uuid;

use crate::domain::{Category, CategoryKind};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Partial update for an ordinary category. System categories reject every
/// patch.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub monthly_budget: Option<Option<f64>>,
}

pub struct CategoryService;

impl CategoryService {
    pub fn add(ledger: &mut Ledger, name: &str, kind: CategoryKind) -> Result<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("category name is required".into()));
        }
        Self::validate_name(ledger, None, name, kind)?;
        Ok(ledger.add_category(Category::new(name, kind)))
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: CategoryPatch) -> Result<()> {
        let (is_system, current_kind) = {
            let category = ledger
                .category(id)
                .ok_or_else(|| LedgerError::NotFound("category".into()))?;
            (category.is_system, category.kind)
        };
        if is_system {
            return Err(LedgerError::InvariantViolation(
                "system categories cannot be edited".into(),
            ));
        }
        if let Some(name) = patch.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::Validation("category name is required".into()));
            }
            Self::validate_name(ledger, Some(id), name, patch.kind.unwrap_or(current_kind))?;
        }
        let category = ledger
            .category_mut(id)
            .ok_or_else(|| LedgerError::NotFound("category".into()))?;
        if let Some(name) = patch.name {
            category.name = name.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            category.kind = kind;
        }
        if let Some(budget) = patch.monthly_budget {
            category.monthly_budget = budget;
        }
        ledger.touch();
        Ok(())
    }

    /// System categories are undeletable regardless of references; ordinary
    /// ones go only once nothing points at them.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        let category = ledger
            .category(id)
            .ok_or_else(|| LedgerError::NotFound("category".into()))?;
        if category.is_system {
            return Err(LedgerError::InvariantViolation(
                "system categories cannot be deleted".into(),
            ));
        }
        if ledger.transactions.iter().any(|txn| txn.category_id == id) {
            return Err(LedgerError::InvariantViolation(
                "category still has transactions".into(),
            ));
        }
        if ledger
            .purchases
            .iter()
            .any(|purchase| purchase.category_id == id)
        {
            return Err(LedgerError::InvariantViolation(
                "category still has card purchases".into(),
            ));
        }
        ledger.categories.retain(|category| category.id != id);
        ledger.touch();
        Ok(())
    }

    /// Name uniqueness is enforced case-insensitively within a kind, so
    /// "Food" the expense can coexist with "Food" the income refund bucket
    /// but not with a second expense "food".
    fn validate_name(
        ledger: &Ledger,
        exclude: Option<Uuid>,
        candidate: &str,
        kind: CategoryKind,
    ) -> Result<()> {
        let normalized = candidate.trim().to_lowercase();
        let duplicate = ledger.categories.iter().any(|category| {
            category.kind == kind
                && category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(LedgerError::Conflict(format!(
                "category `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
