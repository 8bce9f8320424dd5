//! Validated mutation operations over the in-memory ledger.
//!
//! Services are the single choke point for writes: every cross-entity
//! invariant (paired transfer legs, opening-balance singularity, installment
//! batches, goal categories) is enforced here before any state changes.

pub mod account_service;
pub mod card_service;
pub mod category_service;
pub mod goal_service;
pub mod recurring_service;
pub mod transaction_service;
pub mod transfer_service;

pub use account_service::{AccountPatch, AccountService};
pub use card_service::CardService;
pub use category_service::{CategoryPatch, CategoryService};
pub use goal_service::GoalService;
pub use recurring_service::RecurringService;
pub use transaction_service::{TransactionDraft, TransactionPatch, TransactionService};
pub use transfer_service::{TransferPatch, TransferService};

/// Outcome of the caller's confirmation channel.
///
/// Operations that can destroy linked data or insert a likely duplicate
/// take this as an argument. The guard that decides whether confirmation
/// is needed runs either way; passing `Unconfirmed` turns that guard into
/// a dry-run probe returning [`crate::errors::LedgerError::Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Unconfirmed,
    Confirmed,
}

impl Confirmation {
    pub fn granted(self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Maximum stored length of a transaction description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Trims and truncates free-form descriptions before they are stored.
pub(crate) fn clean_description(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.chars().take(MAX_DESCRIPTION_LEN).collect()
}
