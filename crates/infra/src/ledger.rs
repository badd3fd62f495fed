//! Ledger coordinator.
//!
//! Every quantity-changing operation runs as one [`LedgerStore::transact`] call
//! on the affected item's book:
//!
//! ```text
//! input
//!   ↓
//! 1. Normalize names and validate quantities (no lock held)
//!   ↓
//! 2. Lock the item book
//!   ↓
//! 3. Decide: pure domain functions produce the item event and ledger row
//!   ↓
//! 4. Commit: apply the event, append the row, refresh the sale cache
//! ```
//!
//! Step 3 is the only step that can fail once the lock is held, so a rejected
//! operation leaves the book exactly as it was.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use druggist_core::text::capitalize;
use druggist_core::{
    Actor, Aggregate, DomainError, ItemId, MovementId, Quantity, ReservationId, SaleId, UnitId,
};
use druggist_inventory::{
    AdjustStock, InventoryItem, ItemCommand, MeasurementUnit, NewItem, ReviseDetails,
};
use druggist_reservations::{ConvertToSale, PlaceLock, Reservation, plan_lock};
use druggist_sales::{RecordSale, Sale, SalesSummary, TopSeller, plan_sale, top_sellers};
use druggist_stocking::{RecordAddition, StockMovement, plan_addition};

use crate::clock::{Clock, SystemClock};
use crate::config::ReportConfig;
use crate::store::{ItemBook, LedgerStore, StoreError};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure of a coordinator operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A business rule rejected the operation; nothing was changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UnknownItem(_) => LedgerError::Domain(DomainError::NotFound),
            other => LedgerError::Store(other),
        }
    }
}

impl LedgerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Store(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::Domain(DomainError::NotFound))
    }

    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, LedgerError::Domain(DomainError::InsufficientStock { .. }))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LedgerError::Domain(
                DomainError::InvalidQuantity(_)
                    | DomainError::Validation(_)
                    | DomainError::InvalidId(_)
            )
        )
    }
}

/// Edits accepted by [`Ledger::update_item`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub batch_no: Option<String>,
    /// New absolute stock level; applied as an adjustment by the difference.
    pub stock: Option<Decimal>,
}

/// Entry point for every stock-ledger operation.
pub struct Ledger<S, C = SystemClock> {
    store: S,
    clock: C,
    reports: ReportConfig,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: LedgerStore, C: Clock> Ledger<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            reports: ReportConfig::default(),
        }
    }

    pub fn with_report_config(mut self, reports: ReportConfig) -> Self {
        self.reports = reports;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn report_config(&self) -> &ReportConfig {
        &self.reports
    }

    // ---- catalog ----

    /// Add an item to the catalog. The name is capitalized, the batch trimmed.
    pub fn create_item(&self, new: NewItem) -> LedgerResult<InventoryItem> {
        let result = self.create_item_inner(new);
        if let Err(e) = &result {
            warn!(operation = "create_item", error = %e, "operation rejected");
        }
        result
    }

    fn create_item_inner(&self, mut new: NewItem) -> LedgerResult<InventoryItem> {
        new.name = capitalize(&new.name);
        new.batch_no = new.batch_no.trim().to_string();

        if let Some(unit_id) = new.unit_id {
            if self.store.unit(unit_id)?.is_none() {
                return Err(DomainError::not_found().into());
            }
        }

        let item = InventoryItem::create(ItemId::new(), new)?;
        self.store.insert_item(item.clone())?;

        debug!(
            item_id = %item.id_typed(),
            name = item.name(),
            stock = %item.stock(),
            "item created"
        );
        Ok(item)
    }

    pub fn get_item(&self, item_id: ItemId) -> LedgerResult<InventoryItem> {
        self.store
            .read(item_id, |book| book.item.clone())?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// Move an item's stock by `delta` (positive or negative, never zero).
    pub fn adjust_stock(&self, item_id: ItemId, delta: Decimal) -> LedgerResult<InventoryItem> {
        let result: LedgerResult<InventoryItem> = self.store.transact(item_id, |book| {
            let command = ItemCommand::AdjustStock(AdjustStock { item_id, delta });
            let events = book.item.handle(&command)?;
            for event in &events {
                book.item.apply(event);
            }
            Ok(book.item.clone())
        });

        match &result {
            Ok(item) => debug!(
                item_id = %item_id,
                delta = %delta,
                stock = %item.stock(),
                "stock adjusted"
            ),
            Err(e) => rejected("adjust_stock", item_id, e),
        }
        result
    }

    /// Edit name, batch and/or stock level in one step.
    ///
    /// A new stock level is applied as an adjustment by the difference from the
    /// current stock; an unchanged level is a no-op.
    pub fn update_item(&self, item_id: ItemId, update: ItemUpdate) -> LedgerResult<InventoryItem> {
        let revise = ItemCommand::ReviseDetails(ReviseDetails {
            item_id,
            name: update.name.as_deref().map(capitalize),
            batch_no: update.batch_no.as_deref().map(|b| b.trim().to_string()),
        });

        if update.stock.is_some_and(|s| s < Decimal::ZERO) {
            let err: LedgerError =
                DomainError::invalid_quantity("stock cannot be negative").into();
            rejected("update_item", item_id, &err);
            return Err(err);
        }

        let result: LedgerResult<InventoryItem> = self.store.transact(item_id, |book| {
            let mut events = book.item.handle(&revise)?;
            if let Some(stock) = update.stock {
                let delta = stock - book.item.stock();
                if !delta.is_zero() {
                    let adjust = ItemCommand::AdjustStock(AdjustStock { item_id, delta });
                    events.extend(book.item.handle(&adjust)?);
                }
            }

            for event in &events {
                book.item.apply(event);
            }
            Ok(book.item.clone())
        });

        match &result {
            Ok(item) => debug!(
                item_id = %item_id,
                name = item.name(),
                stock = %item.stock(),
                "item updated"
            ),
            Err(e) => rejected("update_item", item_id, e),
        }
        result
    }

    /// Every item, ordered by name.
    pub fn list_items(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.collect_items(|_| true)
    }

    /// Items whose name or batch contains `query`, ignoring case.
    pub fn search_items(&self, query: &str) -> LedgerResult<Vec<InventoryItem>> {
        let query = query.trim();
        self.collect_items(|item| item.matches(query))
    }

    pub fn list_low_stock(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.collect_items(InventoryItem::is_low_stock)
    }

    /// Items expiring after `today` and no later than `today + within_days`.
    pub fn list_expiring(
        &self,
        today: NaiveDate,
        within_days: u32,
    ) -> LedgerResult<Vec<InventoryItem>> {
        self.collect_items(|item| item.expires_within(today, within_days))
    }

    pub fn list_expired(&self, today: NaiveDate) -> LedgerResult<Vec<InventoryItem>> {
        self.collect_items(|item| item.is_expired(today))
    }

    pub fn list_out_of_stock(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.collect_items(InventoryItem::is_out_of_stock)
    }

    pub fn register_unit(&self, name: &str) -> LedgerResult<MeasurementUnit> {
        let unit = MeasurementUnit::new(UnitId::new(), capitalize(name))?;
        self.store.insert_unit(unit.clone())?;
        debug!(unit_id = %unit.id, name = %unit.name, "unit registered");
        Ok(unit)
    }

    /// Registered units, ordered by name.
    pub fn list_units(&self) -> LedgerResult<Vec<MeasurementUnit>> {
        let mut units = self.store.units()?;
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    // ---- stock additions ----

    /// Receive stock from a supplier.
    pub fn record_addition(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        supplier: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<StockMovement> {
        let result = self.record_addition_inner(item_id, quantity, supplier, actor);
        match &result {
            Ok(m) => debug!(
                item_id = %item_id,
                movement_id = %m.id,
                quantity = %m.quantity,
                stock = %m.resulting_total,
                actor = %m.actor.username,
                "stock added"
            ),
            Err(e) => rejected("record_addition", item_id, e),
        }
        result
    }

    fn record_addition_inner(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        supplier: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<StockMovement> {
        let quantity = Quantity::new(quantity)?;
        let supplier = non_blank(supplier).map(capitalize);

        self.store.transact(item_id, |book| {
            // Stamped under the item lock so timestamps follow commit order.
            let cmd = RecordAddition {
                movement_id: MovementId::new(),
                item_id,
                quantity,
                supplier,
                actor: actor.clone(),
                occurred_at: self.clock.now(),
            };
            let (event, movement) = plan_addition(&book.item, cmd)?;
            book.item.apply(&event);
            book.movements.append(movement.clone());
            Ok(movement)
        })
    }

    /// Additions with `start <= occurred_at <= end`, newest first.
    pub fn find_additions_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<StockMovement>> {
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.movements.between(start, end).cloned()))?;
        druggist_stocking::sort_newest_first(&mut rows);
        Ok(rows)
    }

    /// Addition history of one item, newest first.
    pub fn additions_for_item(&self, item_id: ItemId) -> LedgerResult<Vec<StockMovement>> {
        let mut rows = self
            .store
            .read(item_id, |book| {
                book.movements.for_item(item_id).cloned().collect::<Vec<_>>()
            })?
            .ok_or(DomainError::NotFound)?;
        druggist_stocking::sort_newest_first(&mut rows);
        Ok(rows)
    }

    // ---- reservations ----

    /// Hold `quantity` of an item for a client.
    ///
    /// The quantity leaves available stock immediately. The item's most recent
    /// sale has its `remaining_quantity` refreshed to the new stock.
    pub fn lock(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        client: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<Reservation> {
        let result = self.lock_inner(item_id, quantity, client, actor);
        match &result {
            Ok(r) => debug!(
                item_id = %item_id,
                reservation_id = %r.id,
                quantity = %r.quantity,
                actor = %r.locked_by.username,
                "stock locked"
            ),
            Err(e) => rejected("lock", item_id, e),
        }
        result
    }

    fn lock_inner(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        client: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<Reservation> {
        let quantity = Quantity::new(quantity)?;
        let client = non_blank(client).map(str::to_string);
        let reservation_id = ReservationId::new();

        // Index first so the reservation is routable as soon as it commits.
        self.store.index_reservation(reservation_id, item_id)?;

        let result: LedgerResult<Reservation> = self.store.transact(item_id, |book| {
            let cmd = PlaceLock {
                reservation_id,
                item_id,
                quantity,
                client,
                actor: actor.clone(),
                occurred_at: self.clock.now(),
            };
            let (event, reservation) = plan_lock(&book.item, cmd)?;
            book.item.apply(&event);
            book.reservations.open(reservation.clone());
            refresh_latest_sale(book);
            Ok(reservation)
        });

        if result.is_err() {
            self.forget_reservation(reservation_id);
        }
        result
    }

    /// Release a reservation and return its quantity to stock.
    ///
    /// Fails with `NotFound` when the reservation is unknown or already closed.
    pub fn unlock(&self, reservation_id: ReservationId) -> LedgerResult<InventoryItem> {
        let item_id = self.locate_reservation(reservation_id)?;

        let result: LedgerResult<InventoryItem> = self.store.transact(item_id, |book| {
            let reservation = open_reservation(book, reservation_id)?;
            let event = reservation.release(&book.item)?;

            book.reservations.take(reservation_id);
            book.item.apply(&event);
            refresh_latest_sale(book);
            Ok(book.item.clone())
        });

        match &result {
            Ok(item) => {
                self.forget_reservation(reservation_id);
                debug!(
                    item_id = %item_id,
                    reservation_id = %reservation_id,
                    stock = %item.stock(),
                    "stock unlocked"
                );
            }
            Err(e) => rejected("unlock", item_id, e),
        }
        result
    }

    /// Turn a reservation into a sale. Stock is not withdrawn a second time.
    pub fn convert_to_sale(
        &self,
        reservation_id: ReservationId,
        actor: &Actor,
    ) -> LedgerResult<Sale> {
        let item_id = self.locate_reservation(reservation_id)?;

        let result: LedgerResult<Sale> = self.store.transact(item_id, |book| {
            let reservation = open_reservation(book, reservation_id)?;
            let cmd = ConvertToSale {
                sale_id: SaleId::new(),
                actor: actor.clone(),
                occurred_at: self.clock.now(),
            };
            let sale = reservation.into_sale(&book.item, cmd)?;

            book.reservations.take(reservation_id);
            book.sales.append(sale.clone());
            Ok(sale)
        });

        match &result {
            Ok(sale) => {
                self.forget_reservation(reservation_id);
                debug!(
                    item_id = %item_id,
                    reservation_id = %reservation_id,
                    sale_id = %sale.id,
                    quantity = %sale.quantity,
                    "reservation converted to sale"
                );
            }
            Err(e) => rejected("convert_to_sale", item_id, e),
        }
        result
    }

    /// Open reservations whose item name or reserving user contains `query`,
    /// ordered by item name.
    pub fn search_reservations(&self, query: &str) -> LedgerResult<Vec<Reservation>> {
        let query = query.trim();
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.reservations.search(query).cloned()))?;
        sort_reservations(&mut rows);
        Ok(rows)
    }

    /// Every open reservation, ordered by item name.
    pub fn list_reservations(&self) -> LedgerResult<Vec<Reservation>> {
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.reservations.iter().cloned()))?;
        sort_reservations(&mut rows);
        Ok(rows)
    }

    // ---- sales ----

    /// Sell directly from available stock.
    pub fn record_sale(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        client: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<Sale> {
        let result = self.record_sale_inner(item_id, quantity, client, actor);
        match &result {
            Ok(sale) => debug!(
                item_id = %item_id,
                sale_id = %sale.id,
                quantity = %sale.quantity,
                remaining = %sale.remaining_quantity,
                actor = %sale.actor.username,
                "sale recorded"
            ),
            Err(e) => rejected("record_sale", item_id, e),
        }
        result
    }

    fn record_sale_inner(
        &self,
        item_id: ItemId,
        quantity: Decimal,
        client: Option<&str>,
        actor: &Actor,
    ) -> LedgerResult<Sale> {
        let quantity = Quantity::new(quantity)?;
        let client = non_blank(client).map(str::to_string);

        self.store.transact(item_id, |book| {
            let cmd = RecordSale {
                sale_id: SaleId::new(),
                item_id,
                quantity,
                client,
                actor: actor.clone(),
                occurred_at: self.clock.now(),
            };
            let (event, sale) = plan_sale(&book.item, cmd)?;
            book.item.apply(&event);
            book.sales.append(sale.clone());
            Ok(sale)
        })
    }

    /// Sales with `start <= occurred_at <= end`, newest first.
    pub fn find_sales_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<Sale>> {
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.sales.between(start, end).cloned()))?;
        druggist_sales::sort_newest_first(&mut rows);
        Ok(rows)
    }

    /// Sales made on the given UTC calendar day, newest first.
    pub fn sales_on(&self, date: NaiveDate) -> LedgerResult<Vec<Sale>> {
        let mut rows = Vec::new();
        self.store.for_each(|book| {
            rows.extend(
                book.sales
                    .iter()
                    .filter(|s| s.occurred_at.date_naive() == date)
                    .cloned(),
            )
        })?;
        druggist_sales::sort_newest_first(&mut rows);
        Ok(rows)
    }

    /// Sales whose client, item name or batch contains `query`, newest first.
    pub fn search_sales(&self, query: &str) -> LedgerResult<Vec<Sale>> {
        let query = query.trim();
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.sales.search(query).cloned()))?;
        druggist_sales::sort_newest_first(&mut rows);
        Ok(rows)
    }

    /// Best-selling items over all recorded sales, keyed by each item's
    /// current name.
    pub fn top_sellers(&self, limit: usize) -> LedgerResult<Vec<TopSeller>> {
        let lines = self.sold_volumes()?;
        Ok(top_sellers(lines, limit)?)
    }

    /// Count and volume of sales with `start <= occurred_at <= end`.
    pub fn sales_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<SalesSummary> {
        let mut rows = Vec::new();
        self.store
            .for_each(|book| rows.extend(book.sales.between(start, end).cloned()))?;
        Ok(SalesSummary::from_sales(&rows)?)
    }

    /// `(current item name, quantity)` for every recorded sale.
    fn sold_volumes(&self) -> LedgerResult<Vec<(String, Decimal)>> {
        let mut lines = Vec::new();
        self.store.for_each(|book| {
            let name = book.item.name();
            lines.extend(
                book.sales
                    .iter()
                    .map(|s| (name.to_string(), s.quantity.value())),
            )
        })?;
        Ok(lines)
    }

    // ---- helpers ----

    pub(crate) fn collect_items<F>(&self, mut keep: F) -> LedgerResult<Vec<InventoryItem>>
    where
        F: FnMut(&InventoryItem) -> bool,
    {
        let mut items = Vec::new();
        self.store.for_each(|book| {
            if keep(&book.item) {
                items.push(book.item.clone());
            }
        })?;
        items.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.id_typed().cmp(&b.id_typed()))
        });
        Ok(items)
    }

    fn locate_reservation(&self, reservation_id: ReservationId) -> LedgerResult<ItemId> {
        match self.store.locate_reservation(reservation_id)? {
            Some(item_id) => Ok(item_id),
            None => {
                debug!(reservation_id = %reservation_id, "unknown reservation");
                Err(DomainError::not_found().into())
            }
        }
    }

    fn forget_reservation(&self, reservation_id: ReservationId) {
        if let Err(e) = self.store.forget_reservation(reservation_id) {
            warn!(
                reservation_id = %reservation_id,
                error = %e,
                "failed to drop reservation from index"
            );
        }
    }
}

fn rejected(operation: &'static str, item_id: ItemId, error: &LedgerError) {
    warn!(operation, item_id = %item_id, error = %error, "operation rejected");
}

fn open_reservation(book: &ItemBook, reservation_id: ReservationId) -> LedgerResult<Reservation> {
    book.reservations
        .get(reservation_id)
        .cloned()
        .ok_or_else(|| DomainError::not_found().into())
}

fn refresh_latest_sale(book: &mut ItemBook) {
    let item_id = book.item.id_typed();
    let stock = book.item.stock();
    book.sales.refresh_remaining(item_id, stock);
}

fn sort_reservations(rows: &mut [Reservation]) {
    rows.sort_by(|a, b| {
        a.item_name
            .cmp(&b.item_name)
            .then_with(|| a.occurred_at.cmp(&b.occurred_at))
    });
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
