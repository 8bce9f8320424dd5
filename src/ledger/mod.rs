//! The in-memory ledger aggregate and its pure engines.
//!
//! All entity collections live here as flat vectors; every multi-entity
//! mutation goes through the services in [`crate::core`] so invariants are
//! enforced at a single choke point.

pub mod balance;
pub mod billing;
pub mod recurring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Account, CardAccount, CardInstallment, CardPurchase, Category, CategoryKind, InvestmentGoal,
    Transaction, CARD_PAYMENT_CATEGORY, OPENING_BALANCE_CATEGORY, TRANSFER_CATEGORY,
};
use crate::errors::{LedgerError, Result};

pub use balance::balance_as_of;
pub use billing::{cycle_summary, generate_installments, CycleStatus, CycleSummary};
pub use recurring::generate_due_instances;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Snapshot of every collection the engine operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub cards: Vec<CardAccount>,
    #[serde(default)]
    pub purchases: Vec<CardPurchase>,
    #[serde(default)]
    pub installments: Vec<CardInstallment>,
    #[serde(default)]
    pub goals: Vec<InvestmentGoal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    /// Creates an empty ledger with the three reserved system categories
    /// seeded. System categories all carry the Transfer kind: the balance
    /// fold branches on the transaction role to tell them apart.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            categories: vec![
                Category::system(TRANSFER_CATEGORY, CategoryKind::Transfer),
                Category::system(OPENING_BALANCE_CATEGORY, CategoryKind::Transfer),
                Category::system(CARD_PAYMENT_CATEGORY, CategoryKind::Transfer),
            ],
            transactions: Vec::new(),
            cards: Vec::new(),
            purchases: Vec::new(),
            installments: Vec::new(),
            goals: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_card(&mut self, card: CardAccount) -> Uuid {
        let id = card.id;
        self.cards.push(card);
        self.touch();
        id
    }

    pub fn add_purchase(&mut self, purchase: CardPurchase) -> Uuid {
        let id = purchase.id;
        self.purchases.push(purchase);
        self.touch();
        id
    }

    pub fn add_goal(&mut self, goal: InvestmentGoal) -> Uuid {
        let id = goal.id;
        self.goals.push(goal);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn card(&self, id: Uuid) -> Option<&CardAccount> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn card_mut(&mut self, id: Uuid) -> Option<&mut CardAccount> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    pub fn purchase(&self, id: Uuid) -> Option<&CardPurchase> {
        self.purchases.iter().find(|purchase| purchase.id == id)
    }

    pub fn goal(&self, id: Uuid) -> Option<&InvestmentGoal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Option<&mut InvestmentGoal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    /// Looks up one of the seeded system categories by its reserved name.
    pub fn system_category(&self, name: &str) -> Result<&Category> {
        self.categories
            .iter()
            .find(|category| category.is_system && category.name == name)
            .ok_or_else(|| LedgerError::NotFound(format!("system category `{name}`")))
    }

    pub fn transactions_for_account(&self, account_id: Uuid) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |txn| txn.account_id == account_id)
    }

    pub fn installments_for_purchase(
        &self,
        purchase_id: Uuid,
    ) -> impl Iterator<Item = &CardInstallment> {
        self.installments
            .iter()
            .filter(move |installment| installment.purchase_id == purchase_id)
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        let removed = self.transactions.remove(index);
        self.touch();
        Some(removed)
    }
}
