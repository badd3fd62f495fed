//! Infrastructure layer: item-book storage, the ledger coordinator, reports
//! and configuration.

pub mod clock;
pub mod config;
pub mod ledger;
pub mod reports;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{LedgerConfig, ReportConfig};
pub use ledger::{ItemUpdate, Ledger, LedgerError, LedgerResult};
pub use reports::Dashboard;
pub use store::{InMemoryLedgerStore, ItemBook, LedgerStore, StoreError};
