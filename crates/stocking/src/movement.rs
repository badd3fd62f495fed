use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use druggist_core::{Actor, DomainResult, Entity, ItemId, MovementId, Quantity};
use druggist_inventory::{InventoryItem, ItemEvent};

/// One restocking event. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: Quantity,
    /// Item stock right after this addition.
    pub resulting_total: Decimal,
    pub supplier: Option<String>,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

impl Entity for StockMovement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: RecordAddition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAddition {
    pub movement_id: MovementId,
    pub item_id: ItemId,
    pub quantity: Quantity,
    pub supplier: Option<String>,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Decide a stock addition against the current item state.
///
/// Returns the item event to apply and the movement row to append. Nothing is
/// mutated; `resulting_total` is the post-addition stock carried by the event.
pub fn plan_addition(
    item: &InventoryItem,
    cmd: RecordAddition,
) -> DomainResult<(ItemEvent, StockMovement)> {
    let adjusted = item.replenish(cmd.quantity)?;
    let resulting_total = adjusted.resulting_stock;

    let movement = StockMovement {
        id: cmd.movement_id,
        item_id: item.id_typed(),
        item_name: item.name().to_string(),
        quantity: cmd.quantity,
        resulting_total,
        supplier: cmd.supplier,
        actor: cmd.actor,
        occurred_at: cmd.occurred_at,
    };

    Ok((ItemEvent::StockAdjusted(adjusted), movement))
}
