use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use druggist_core::ItemId;

use crate::movement::StockMovement;

/// Append-only list of stock additions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLedger {
    rows: Vec<StockMovement>,
}

impl MovementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, movement: StockMovement) {
        self.rows.push(movement);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &StockMovement> {
        self.rows.iter()
    }

    pub fn for_item(&self, item_id: ItemId) -> impl Iterator<Item = &StockMovement> {
        self.rows.iter().filter(move |m| m.item_id == item_id)
    }

    /// Rows with `start <= occurred_at <= end`.
    pub fn between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &StockMovement> {
        self.rows
            .iter()
            .filter(move |m| m.occurred_at >= start && m.occurred_at <= end)
    }
}

/// Sort movements newest first.
pub fn sort_newest_first(rows: &mut [StockMovement]) {
    rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use druggist_core::{Actor, MovementId, Quantity, UserId};
    use rust_decimal::Decimal;

    fn movement(item_id: ItemId, at: DateTime<Utc>) -> StockMovement {
        StockMovement {
            id: MovementId::new(),
            item_id,
            item_name: "Insulin".to_string(),
            quantity: Quantity::new(Decimal::ONE).unwrap(),
            resulting_total: Decimal::ONE,
            supplier: None,
            actor: Actor::new(UserId::new(), "clerk"),
            occurred_at: at,
        }
    }

    #[test]
    fn between_is_inclusive_and_sort_puts_newest_first() {
        let item_id = ItemId::new();
        let t0 = Utc::now();
        let mut ledger = MovementLedger::new();
        ledger.append(movement(item_id, t0));
        ledger.append(movement(item_id, t0 + Duration::hours(1)));
        ledger.append(movement(item_id, t0 + Duration::hours(3)));

        let mut rows: Vec<_> = ledger
            .between(t0, t0 + Duration::hours(1))
            .cloned()
            .collect();
        sort_newest_first(&mut rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].occurred_at, t0 + Duration::hours(1));
        assert_eq!(rows[1].occurred_at, t0);
    }

    #[test]
    fn for_item_filters_other_items() {
        let a = ItemId::new();
        let mut ledger = MovementLedger::new();
        ledger.append(movement(a, Utc::now()));
        ledger.append(movement(ItemId::new(), Utc::now()));
        assert_eq!(ledger.for_item(a).count(), 1);
    }
}
