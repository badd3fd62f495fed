//! Stock-movement ledger: restocking history.
//!
//! Additions are permanent; there is no operation that removes a movement.

pub mod ledger;
pub mod movement;

pub use ledger::{MovementLedger, sort_newest_first};
pub use movement::{RecordAddition, StockMovement, plan_addition};
