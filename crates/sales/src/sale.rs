use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use druggist_core::text::contains_ignore_case;
use druggist_core::{Actor, DomainResult, Entity, ItemId, Quantity, SaleId};
use druggist_inventory::{InventoryItem, ItemEvent};

/// A completed sale.
///
/// `item_name` and `batch_no` are copied from the item when the sale is made
/// and survive later edits to the item.
///
/// `remaining_quantity` starts as the item's stock right after the sale, but it
/// is a display cache rather than sale-time truth: locking or unlocking stock on
/// the same item later overwrites it on the item's most recent sale (see
/// [`crate::SaleLedger::refresh_remaining`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub item_id: ItemId,
    pub item_name: String,
    pub batch_no: String,
    pub quantity: Quantity,
    pub client: Option<String>,
    pub remaining_quantity: Decimal,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

impl Sale {
    /// Case-insensitive match on client, item name or batch number.
    pub fn matches(&self, query: &str) -> bool {
        self.client
            .as_deref()
            .is_some_and(|c| contains_ignore_case(c, query))
            || contains_ignore_case(&self.item_name, query)
            || contains_ignore_case(&self.batch_no, query)
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: RecordSale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSale {
    pub sale_id: SaleId,
    pub item_id: ItemId,
    pub quantity: Quantity,
    pub client: Option<String>,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Decide a direct sale against the current item state.
///
/// Fails with `InsufficientStock` when the item holds less than the requested
/// quantity. On success returns the stock withdrawal to apply and the sale row
/// whose `remaining_quantity` is the post-withdrawal stock.
pub fn plan_sale(item: &InventoryItem, cmd: RecordSale) -> DomainResult<(ItemEvent, Sale)> {
    let adjusted = item.withdraw(cmd.quantity)?;
    let remaining_quantity = adjusted.resulting_stock;

    let sale = Sale {
        id: cmd.sale_id,
        item_id: item.id_typed(),
        item_name: item.name().to_string(),
        batch_no: item.batch_no().to_string(),
        quantity: cmd.quantity,
        client: cmd.client,
        remaining_quantity,
        actor: cmd.actor,
        occurred_at: cmd.occurred_at,
    };

    Ok((ItemEvent::StockAdjusted(adjusted), sale))
}
