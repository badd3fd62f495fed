//! Dashboard snapshot assembled from the catalog and ledgers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use druggist_inventory::InventoryItem;
use druggist_sales::TopSeller;

use crate::clock::Clock;
use crate::ledger::{Ledger, LedgerResult};
use crate::store::LedgerStore;

/// Counts and watch lists shown on the landing page.
///
/// Each book is read once, so the figures for a single item are consistent
/// with each other; figures across items may straddle concurrent writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_items: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    /// Items at or below the configured near-empty threshold.
    pub near_empty_count: usize,
    /// Open reservations.
    pub locked_count: usize,
    pub expired_count: usize,
    pub expiring_soon_count: usize,
    pub top_sellers: Vec<TopSeller>,
    pub expired: Vec<InventoryItem>,
    pub expiring_soon: Vec<InventoryItem>,
    pub low_stock: Vec<InventoryItem>,
}

impl<S: LedgerStore, C: Clock> Ledger<S, C> {
    /// Build the dashboard as of `today`.
    pub fn dashboard(&self, today: NaiveDate) -> LedgerResult<Dashboard> {
        let config = self.report_config();
        let near_empty = config.near_empty_threshold();

        let mut dashboard = Dashboard::default();
        let mut sold = Vec::new();

        self.store().for_each(|book| {
            let item = &book.item;
            dashboard.total_items += 1;
            dashboard.locked_count += book.reservations.len();

            if item.is_out_of_stock() {
                dashboard.out_of_stock_count += 1;
            }
            if item.stock() <= near_empty {
                dashboard.near_empty_count += 1;
            }
            if item.is_low_stock() {
                dashboard.low_stock.push(item.clone());
            }
            if item.is_expired(today) {
                dashboard.expired.push(item.clone());
            }
            if item.expires_within(today, config.expiry_window_days) {
                dashboard.expiring_soon.push(item.clone());
            }
            let name = item.name();
            sold.extend(
                book.sales
                    .iter()
                    .map(|s| (name.to_string(), s.quantity.value())),
            );
        })?;

        for list in [
            &mut dashboard.low_stock,
            &mut dashboard.expired,
            &mut dashboard.expiring_soon,
        ] {
            list.sort_by(|a, b| a.name().cmp(b.name()));
        }
        dashboard.low_stock_count = dashboard.low_stock.len();
        dashboard.expired_count = dashboard.expired.len();
        dashboard.expiring_soon_count = dashboard.expiring_soon.len();
        dashboard.top_sellers = druggist_sales::top_sellers(sold, config.top_sellers)?;

        Ok(dashboard)
    }
}
