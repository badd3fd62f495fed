//! Backing store for the ledger.
//!
//! The store owns one [`ItemBook`] per catalog item and hands out exclusive
//! access to a single book per transaction. It makes no business decisions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use r#trait::{ItemBook, LedgerStore, StoreError};
