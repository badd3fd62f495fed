//! Item catalog domain module.
//!
//! This crate contains the rules for catalog items and their stock counter,
//! implemented purely as deterministic domain logic (no IO, no locking, no storage).

pub mod item;
pub mod unit;

pub use item::{
    AdjustStock, DetailsRevised, InventoryItem, ItemCommand, ItemEvent, NewItem, ReviseDetails,
    StockAdjusted,
};
pub use unit::MeasurementUnit;
