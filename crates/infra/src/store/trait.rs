use serde::{Deserialize, Serialize};
use thiserror::Error;

use druggist_core::{ItemId, ReservationId, UnitId};
use druggist_inventory::{InventoryItem, MeasurementUnit};
use druggist_reservations::ReservationLedger;
use druggist_sales::SaleLedger;
use druggist_stocking::MovementLedger;

/// One item together with every ledger row that references it.
///
/// A book is the unit of serialization: every quantity-changing operation
/// touches exactly one book, and holds it exclusively while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBook {
    pub item: InventoryItem,
    pub movements: MovementLedger,
    pub sales: SaleLedger,
    pub reservations: ReservationLedger,
}

impl ItemBook {
    pub fn new(item: InventoryItem) -> Self {
        Self {
            item,
            movements: MovementLedger::new(),
            sales: SaleLedger::new(),
            reservations: ReservationLedger::new(),
        }
    }
}

/// Store operation error.
///
/// These are infrastructure failures, as opposed to the business rejections in
/// `DomainError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// Item-partitioned storage for the stock ledger.
///
/// ## Transactions
///
/// [`LedgerStore::transact`] runs a closure with exclusive access to one
/// item's book. Concurrent transactions on the same item are serialized;
/// transactions on different items may run in parallel.
///
/// The store does not roll back: a closure must complete every fallible step
/// before its first write to the book, so that an `Err` leaves the book as it
/// found it.
///
/// ## Reads
///
/// Reads lock each book briefly. A multi-item read is consistent per item but
/// not across items.
pub trait LedgerStore: Send + Sync {
    /// Add a new book for `item`.
    fn insert_item(&self, item: InventoryItem) -> Result<(), StoreError>;

    /// Run `f` with exclusive access to the book of `item_id`.
    ///
    /// Fails with `StoreError::UnknownItem` when there is no such book.
    fn transact<R, E, F>(&self, item_id: ItemId, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut ItemBook) -> Result<R, E>,
        E: From<StoreError>;

    /// Project one book, or `None` when the item is unknown.
    fn read<R, F>(&self, item_id: ItemId, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&ItemBook) -> R;

    /// Visit every book in unspecified order.
    fn for_each<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnMut(&ItemBook);

    /// Remember which item holds an open reservation.
    fn index_reservation(&self, id: ReservationId, item_id: ItemId) -> Result<(), StoreError>;

    /// Drop a reservation from the index. Unknown ids are ignored.
    fn forget_reservation(&self, id: ReservationId) -> Result<(), StoreError>;

    /// Item holding the reservation, if indexed.
    ///
    /// The index may briefly point at a reservation that was already closed;
    /// callers must re-check inside the item's transaction.
    fn locate_reservation(&self, id: ReservationId) -> Result<Option<ItemId>, StoreError>;

    fn insert_unit(&self, unit: MeasurementUnit) -> Result<(), StoreError>;

    fn unit(&self, id: UnitId) -> Result<Option<MeasurementUnit>, StoreError>;

    fn units(&self) -> Result<Vec<MeasurementUnit>, StoreError>;
}
