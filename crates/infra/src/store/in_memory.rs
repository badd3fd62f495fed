use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use druggist_core::{ItemId, ReservationId, UnitId};
use druggist_inventory::{InventoryItem, MeasurementUnit};

use super::r#trait::{ItemBook, LedgerStore, StoreError};

/// In-memory ledger store with one mutex per item book.
///
/// The outer map lock is held only long enough to find a book; the book's own
/// mutex is what serializes operations on an item.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    books: RwLock<HashMap<ItemId, Arc<Mutex<ItemBook>>>>,
    reservation_index: RwLock<HashMap<ReservationId, ItemId>>,
    units: RwLock<BTreeMap<UnitId, MeasurementUnit>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self, item_id: ItemId) -> Result<Option<Arc<Mutex<ItemBook>>>, StoreError> {
        let books = self
            .books
            .read()
            .map_err(|_| StoreError::Poisoned("books"))?;
        Ok(books.get(&item_id).cloned())
    }

    fn all_books(&self) -> Result<Vec<Arc<Mutex<ItemBook>>>, StoreError> {
        let books = self
            .books
            .read()
            .map_err(|_| StoreError::Poisoned("books"))?;
        Ok(books.values().cloned().collect())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn insert_item(&self, item: InventoryItem) -> Result<(), StoreError> {
        let item_id = item.id_typed();
        let mut books = self
            .books
            .write()
            .map_err(|_| StoreError::Poisoned("books"))?;

        if books.contains_key(&item_id) {
            return Err(StoreError::DuplicateId(item_id.to_string()));
        }
        books.insert(item_id, Arc::new(Mutex::new(ItemBook::new(item))));
        Ok(())
    }

    fn transact<R, E, F>(&self, item_id: ItemId, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut ItemBook) -> Result<R, E>,
        E: From<StoreError>,
    {
        let book = self.book(item_id)?.ok_or(StoreError::UnknownItem(item_id))?;
        let mut guard = book.lock().map_err(|_| StoreError::Poisoned("item book"))?;
        f(&mut guard)
    }

    fn read<R, F>(&self, item_id: ItemId, f: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&ItemBook) -> R,
    {
        let Some(book) = self.book(item_id)? else {
            return Ok(None);
        };
        let guard = book.lock().map_err(|_| StoreError::Poisoned("item book"))?;
        Ok(Some(f(&guard)))
    }

    fn for_each<F>(&self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&ItemBook),
    {
        for book in self.all_books()? {
            let guard = book.lock().map_err(|_| StoreError::Poisoned("item book"))?;
            f(&guard);
        }
        Ok(())
    }

    fn index_reservation(&self, id: ReservationId, item_id: ItemId) -> Result<(), StoreError> {
        let mut index = self
            .reservation_index
            .write()
            .map_err(|_| StoreError::Poisoned("reservation index"))?;

        if index.contains_key(&id) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
        index.insert(id, item_id);
        Ok(())
    }

    fn forget_reservation(&self, id: ReservationId) -> Result<(), StoreError> {
        let mut index = self
            .reservation_index
            .write()
            .map_err(|_| StoreError::Poisoned("reservation index"))?;
        index.remove(&id);
        Ok(())
    }

    fn locate_reservation(&self, id: ReservationId) -> Result<Option<ItemId>, StoreError> {
        let index = self
            .reservation_index
            .read()
            .map_err(|_| StoreError::Poisoned("reservation index"))?;
        Ok(index.get(&id).copied())
    }

    fn insert_unit(&self, unit: MeasurementUnit) -> Result<(), StoreError> {
        let mut units = self
            .units
            .write()
            .map_err(|_| StoreError::Poisoned("units"))?;

        if units.contains_key(&unit.id) {
            return Err(StoreError::DuplicateId(unit.id.to_string()));
        }
        units.insert(unit.id, unit);
        Ok(())
    }

    fn unit(&self, id: UnitId) -> Result<Option<MeasurementUnit>, StoreError> {
        let units = self
            .units
            .read()
            .map_err(|_| StoreError::Poisoned("units"))?;
        Ok(units.get(&id).cloned())
    }

    fn units(&self) -> Result<Vec<MeasurementUnit>, StoreError> {
        let units = self
            .units
            .read()
            .map_err(|_| StoreError::Poisoned("units"))?;
        Ok(units.values().cloned().collect())
    }
}
