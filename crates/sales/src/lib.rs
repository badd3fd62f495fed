//! Sale ledger domain module.
//!
//! Completed sales with a denormalized "remaining stock" snapshot, plus the
//! read-side summaries built over them. Deterministic logic only.

pub mod ledger;
pub mod sale;
pub mod summary;

pub use ledger::{SaleLedger, sort_newest_first};
pub use sale::{RecordSale, Sale, plan_sale};
pub use summary::{SalesSummary, TopSeller, top_sellers};
