pub mod services;

pub use services::{
    AccountPatch, AccountService, CardService, CategoryPatch, CategoryService, Confirmation,
    GoalService, RecurringService, TransactionDraft, TransactionPatch, TransactionService,
    TransferPatch, TransferService,
};
