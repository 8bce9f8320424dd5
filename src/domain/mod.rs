//! Entity types shared across the ledger engines and services.

pub mod account;
pub mod card;
pub mod category;
pub mod common;
pub mod competency;
pub mod goal;
pub mod transaction;

pub use account::Account;
pub use card::{CardAccount, CardInstallment, CardPurchase};
pub use category::{
    Category, CategoryKind, CARD_PAYMENT_CATEGORY, GOAL_CATEGORY_PREFIX,
    OPENING_BALANCE_CATEGORY, TRANSFER_CATEGORY,
};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use competency::Competency;
pub use goal::InvestmentGoal;
pub use transaction::{Frequency, LegDirection, RecurrenceRule, Transaction, TransactionRole};
