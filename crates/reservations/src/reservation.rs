use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use druggist_core::text::contains_ignore_case;
use druggist_core::{
    Actor, DomainError, DomainResult, Entity, ItemId, Quantity, ReservationId, SaleId,
};
use druggist_inventory::{InventoryItem, ItemEvent};
use druggist_sales::Sale;

/// An open hold on stock for a client.
///
/// The quantity already left the item's available stock when the reservation
/// was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: Quantity,
    pub client: Option<String>,
    pub locked_by: Actor,
    pub occurred_at: DateTime<Utc>,
}

impl Entity for Reservation {
    type Id = ReservationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: PlaceLock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLock {
    pub reservation_id: ReservationId,
    pub item_id: ItemId,
    pub quantity: Quantity,
    pub client: Option<String>,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConvertToSale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertToSale {
    pub sale_id: SaleId,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Decide placing a lock against the current item state.
///
/// Fails with `InsufficientStock` when the item holds less than the requested
/// quantity.
pub fn plan_lock(item: &InventoryItem, cmd: PlaceLock) -> DomainResult<(ItemEvent, Reservation)> {
    let event = ItemEvent::StockAdjusted(item.withdraw(cmd.quantity)?);

    let reservation = Reservation {
        id: cmd.reservation_id,
        item_id: item.id_typed(),
        item_name: item.name().to_string(),
        quantity: cmd.quantity,
        client: cmd.client,
        locked_by: cmd.actor,
        occurred_at: cmd.occurred_at,
    };

    Ok((event, reservation))
}

impl Reservation {
    /// Case-insensitive match on item name or the reserving user's name.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.item_name, query)
            || contains_ignore_case(&self.locked_by.username, query)
    }

    /// Terminal transition: give the held quantity back to the item.
    pub fn release(self, item: &InventoryItem) -> DomainResult<ItemEvent> {
        self.ensure_item(item)?;
        Ok(ItemEvent::StockAdjusted(item.replenish(self.quantity)?))
    }

    /// Terminal transition: turn the hold into a sale.
    ///
    /// Stock is not withdrawn again; the sale's `remaining_quantity` is the
    /// item's current stock, which already excludes the held quantity.
    pub fn into_sale(self, item: &InventoryItem, cmd: ConvertToSale) -> DomainResult<Sale> {
        self.ensure_item(item)?;

        Ok(Sale {
            id: cmd.sale_id,
            item_id: self.item_id,
            item_name: item.name().to_string(),
            batch_no: item.batch_no().to_string(),
            quantity: self.quantity,
            client: self.client,
            remaining_quantity: item.stock(),
            actor: cmd.actor,
            occurred_at: cmd.occurred_at,
        })
    }

    fn ensure_item(&self, item: &InventoryItem) -> DomainResult<()> {
        if item.id_typed() != self.item_id {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}
