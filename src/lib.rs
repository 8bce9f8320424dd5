#![doc(test(attr(deny(warnings))))]

//! Ledger Core offers foundational personal-finance primitives: accounts,
//! categories, transactions and transfers, credit-card billing cycles,
//! recurring series, and investment goals, all over an in-memory ledger
//! with JSON persistence.

pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod money;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
