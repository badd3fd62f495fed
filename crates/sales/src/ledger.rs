use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use druggist_core::ItemId;

use crate::sale::Sale;

/// Append-only list of sales.
///
/// Rows are never removed. The single permitted in-place edit is the
/// `remaining_quantity` write-back performed by [`SaleLedger::refresh_remaining`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLedger {
    rows: Vec<Sale>,
}

impl SaleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sale: Sale) {
        self.rows.push(sale);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sale> {
        self.rows.iter()
    }

    /// Most recent sale of `item_id` by timestamp; the later-recorded row wins ties.
    pub fn latest_for_item(&self, item_id: ItemId) -> Option<&Sale> {
        self.rows
            .iter()
            .filter(|s| s.item_id == item_id)
            .max_by_key(|s| s.occurred_at)
    }

    /// Overwrite `remaining_quantity` on the item's most recent sale.
    ///
    /// Lock and unlock call this so that the latest sale keeps showing the
    /// item's current stock. Returns `false` when the item has never been sold.
    pub fn refresh_remaining(&mut self, item_id: ItemId, stock: Decimal) -> bool {
        let latest = self
            .rows
            .iter_mut()
            .filter(|s| s.item_id == item_id)
            .max_by_key(|s| s.occurred_at);

        match latest {
            Some(sale) => {
                sale.remaining_quantity = stock;
                true
            }
            None => false,
        }
    }

    /// Rows with `start <= occurred_at <= end`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = &Sale> {
        self.rows
            .iter()
            .filter(move |s| s.occurred_at >= start && s.occurred_at <= end)
    }

    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Sale> {
        self.rows.iter().filter(move |s| s.matches(query))
    }
}

/// Sort sales newest first.
pub fn sort_newest_first(rows: &mut [Sale]) {
    rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
}
