use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use druggist_core::text::contains_ignore_case;
use druggist_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, ItemId, Quantity, UnitId,
};

/// Attributes for a new catalog item.
///
/// Names are expected to be normalized by the caller before creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub batch_no: String,
    pub stock: Decimal,
    pub dose_pack: Decimal,
    pub expiry_date: NaiveDate,
    pub reorder_level: Decimal,
    pub unit_id: Option<UnitId>,
    /// Carried for the collaborator; the ledger never reads it.
    pub selling_price: Option<Decimal>,
}

/// Aggregate root: a drug batch in the catalog and its stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    batch_no: String,
    stock: Decimal,
    dose_pack: Decimal,
    expiry_date: NaiveDate,
    reorder_level: Decimal,
    unit_id: Option<UnitId>,
    selling_price: Option<Decimal>,
    version: u64,
}

impl InventoryItem {
    /// Validate attributes and build a catalog item at version 0.
    pub fn create(id: ItemId, new: NewItem) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if new.batch_no.trim().is_empty() {
            return Err(DomainError::validation("batch_no cannot be empty"));
        }
        if new.stock < Decimal::ZERO {
            return Err(DomainError::invalid_quantity("initial stock cannot be negative"));
        }
        if new.dose_pack <= Decimal::ZERO {
            return Err(DomainError::invalid_quantity("dose_pack must be positive"));
        }
        if new.reorder_level < Decimal::ZERO {
            return Err(DomainError::invalid_quantity("reorder_level cannot be negative"));
        }
        if new.selling_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(DomainError::validation("selling_price cannot be negative"));
        }

        Ok(Self {
            id,
            name: new.name,
            batch_no: new.batch_no,
            stock: new.stock,
            dose_pack: new.dose_pack,
            expiry_date: new.expiry_date,
            reorder_level: new.reorder_level,
            unit_id: new.unit_id,
            selling_price: new.selling_price,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch_no(&self) -> &str {
        &self.batch_no
    }

    pub fn stock(&self) -> Decimal {
        self.stock
    }

    pub fn dose_pack(&self) -> Decimal {
        self.dose_pack
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn reorder_level(&self) -> Decimal {
        self.reorder_level
    }

    pub fn unit_id(&self) -> Option<UnitId> {
        self.unit_id
    }

    pub fn selling_price(&self) -> Option<Decimal> {
        self.selling_price
    }

    /// Stock at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock.is_zero()
    }

    /// Expiry date strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    /// Expiry date in `(today, today + within_days]`.
    pub fn expires_within(&self, today: NaiveDate, within_days: u32) -> bool {
        let horizon = today
            .checked_add_days(Days::new(u64::from(within_days)))
            .unwrap_or(NaiveDate::MAX);
        self.expiry_date > today && self.expiry_date <= horizon
    }

    /// Case-insensitive match on name or batch number.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query) || contains_ignore_case(&self.batch_no, query)
    }

    /// Decide removing `quantity` from available stock (sale or reservation).
    pub fn withdraw(&self, quantity: Quantity) -> DomainResult<StockAdjusted> {
        self.decide_adjust(-quantity.value())
    }

    /// Decide returning or receiving `quantity` into available stock.
    pub fn replenish(&self, quantity: Quantity) -> DomainResult<StockAdjusted> {
        self.decide_adjust(quantity.value())
    }
}

impl AggregateRoot for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AdjustStock (delta may be positive or negative, never zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub item_id: ItemId,
    pub delta: Decimal,
}

/// Command: ReviseDetails (edit name and/or batch number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseDetails {
    pub item_id: ItemId,
    pub name: Option<String>,
    pub batch_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCommand {
    AdjustStock(AdjustStock),
    ReviseDetails(ReviseDetails),
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub item_id: ItemId,
    pub delta: Decimal,
    /// Stock after the adjustment is applied.
    pub resulting_stock: Decimal,
}

/// Event: DetailsRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsRevised {
    pub item_id: ItemId,
    pub name: String,
    pub batch_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEvent {
    StockAdjusted(StockAdjusted),
    DetailsRevised(DetailsRevised),
}

impl Aggregate for InventoryItem {
    type Command = ItemCommand;
    type Event = ItemEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ItemEvent::StockAdjusted(e) => {
                self.stock = e.resulting_stock;
            }
            ItemEvent::DetailsRevised(e) => {
                self.name = e.name.clone();
                self.batch_no = e.batch_no.clone();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ItemCommand::AdjustStock(cmd) => {
                self.ensure_item_id(cmd.item_id)?;
                let adjusted = self.decide_adjust(cmd.delta)?;
                Ok(vec![ItemEvent::StockAdjusted(adjusted)])
            }
            ItemCommand::ReviseDetails(cmd) => self.handle_revise(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_item_id(&self, item_id: ItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn decide_adjust(&self, delta: Decimal) -> DomainResult<StockAdjusted> {
        if delta.is_zero() {
            return Err(DomainError::invalid_quantity("delta cannot be zero"));
        }

        let resulting_stock = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_quantity("stock overflow"))?;
        if resulting_stock < Decimal::ZERO {
            return Err(DomainError::insufficient_stock(-delta, self.stock));
        }

        Ok(StockAdjusted {
            item_id: self.id,
            delta,
            resulting_stock,
        })
    }

    fn handle_revise(&self, cmd: &ReviseDetails) -> DomainResult<Vec<ItemEvent>> {
        self.ensure_item_id(cmd.item_id)?;

        let name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
        let batch_no = cmd.batch_no.clone().unwrap_or_else(|| self.batch_no.clone());

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if batch_no.trim().is_empty() {
            return Err(DomainError::validation("batch_no cannot be empty"));
        }
        if name == self.name && batch_no == self.batch_no {
            return Ok(vec![]);
        }

        Ok(vec![ItemEvent::DetailsRevised(DetailsRevised {
            item_id: self.id,
            name,
            batch_no,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_item(stock: i64, reorder: i64) -> NewItem {
        NewItem {
            name: "Amoxicillin".to_string(),
            batch_no: "AMX-001".to_string(),
            stock: Decimal::from(stock),
            dose_pack: Decimal::from(10),
            expiry_date: test_date(2027, 1, 31),
            reorder_level: Decimal::from(reorder),
            unit_id: None,
            selling_price: None,
        }
    }

    fn item(stock: i64, reorder: i64) -> InventoryItem {
        InventoryItem::create(ItemId::new(), new_item(stock, reorder)).unwrap()
    }

    fn adjust(item: &InventoryItem, delta: i64) -> ItemCommand {
        ItemCommand::AdjustStock(AdjustStock {
            item_id: item.id_typed(),
            delta: Decimal::from(delta),
        })
    }

    #[test]
    fn create_rejects_negative_stock_and_blank_name() {
        let err = InventoryItem::create(ItemId::new(), new_item(-1, 5)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));

        let mut blank = new_item(1, 5);
        blank.name = "   ".to_string();
        let err = InventoryItem::create(ItemId::new(), blank).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn adjust_stock_emits_resulting_stock() {
        let item = item(10, 5);
        let events = item.handle(&adjust(&item, -6)).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ItemEvent::StockAdjusted(e) => {
                assert_eq!(e.delta, Decimal::from(-6));
                assert_eq!(e.resulting_stock, Decimal::from(4));
            }
            _ => panic!("Expected StockAdjusted event"),
        }
    }

    #[test]
    fn adjust_below_zero_is_insufficient_stock() {
        let item = item(3, 1);
        let err = item.handle(&adjust(&item, -4)).unwrap_err();
        assert_eq!(
            err,
            DomainError::insufficient_stock(Decimal::from(4), Decimal::from(3))
        );
    }

    #[test]
    fn zero_delta_is_invalid_quantity() {
        let item = item(3, 1);
        let err = item.handle(&adjust(&item, 0)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
    }

    #[test]
    fn adjust_for_other_item_is_not_found() {
        let item = item(3, 1);
        let cmd = ItemCommand::AdjustStock(AdjustStock {
            item_id: ItemId::new(),
            delta: Decimal::ONE,
        });
        assert_eq!(item.handle(&cmd).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn adjust_past_decimal_range_is_invalid_quantity() {
        let mut new = new_item(0, 0);
        new.stock = Decimal::MAX;
        let item = InventoryItem::create(ItemId::new(), new).unwrap();

        let err = item.replenish(Quantity::new(Decimal::ONE).unwrap()).unwrap_err();
        assert_eq!(err, DomainError::invalid_quantity("stock overflow"));

        let adjusted = item.withdraw(Quantity::new(Decimal::ONE).unwrap()).unwrap();
        assert_eq!(adjusted.resulting_stock, Decimal::MAX - Decimal::ONE);
    }

    #[test]
    fn low_stock_threshold_is_inclusive() {
        let mut item = item(10, 5);
        assert!(!item.is_low_stock());

        let events = item.handle(&adjust(&item, -5)).unwrap();
        item.apply(&events[0]);
        assert_eq!(item.stock(), Decimal::from(5));
        assert!(item.is_low_stock());
    }

    #[test]
    fn expiry_window_excludes_today_and_includes_horizon() {
        let item = item(1, 0);
        let expiry = item.expiry_date();

        assert!(!item.expires_within(expiry, 10));
        assert!(item.expires_within(expiry - Days::new(10), 10));
        assert!(!item.expires_within(expiry - Days::new(11), 10));
        assert!(item.is_expired(expiry + Days::new(1)));
        assert!(!item.is_expired(expiry));
    }

    #[test]
    fn revise_details_is_noop_when_unchanged() {
        let item = item(1, 0);
        let cmd = ItemCommand::ReviseDetails(ReviseDetails {
            item_id: item.id_typed(),
            name: Some(item.name().to_string()),
            batch_no: None,
        });
        assert!(item.handle(&cmd).unwrap().is_empty());
    }

    #[test]
    fn version_increments_on_apply() {
        let mut item = item(10, 5);
        assert_eq!(item.version(), 0);

        let events = item.handle(&adjust(&item, 2)).unwrap();
        item.apply(&events[0]);
        assert_eq!(item.version(), 1);

        let events = item
            .handle(&ItemCommand::ReviseDetails(ReviseDetails {
                item_id: item.id_typed(),
                name: None,
                batch_no: Some("AMX-002".to_string()),
            }))
            .unwrap();
        item.apply(&events[0]);
        assert_eq!(item.version(), 2);
        assert_eq!(item.batch_no(), "AMX-002");
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let item = item(10, 5);
        let before = item.clone();

        let events1 = item.handle(&adjust(&item, -3)).unwrap();
        let events2 = item.handle(&adjust(&item, -3)).unwrap();

        assert_eq!(item, before);
        assert_eq!(events1, events2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: whatever deltas are requested, applying only the
            /// accepted ones never drives stock below zero.
            #[test]
            fn stock_never_goes_negative(
                initial in 0i64..100,
                deltas in prop::collection::vec(-50i64..50, 1..40)
            ) {
                let mut item = item(initial, 5);
                let mut expected = Decimal::from(initial);

                for delta in deltas {
                    match item.handle(&adjust(&item, delta)) {
                        Ok(events) => {
                            for e in &events {
                                item.apply(e);
                            }
                            expected += Decimal::from(delta);
                        }
                        Err(DomainError::InsufficientStock { .. }) => {
                            prop_assert!(expected + Decimal::from(delta) < Decimal::ZERO);
                        }
                        Err(DomainError::InvalidQuantity(_)) => prop_assert_eq!(delta, 0),
                        Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                    }
                    prop_assert!(item.stock() >= Decimal::ZERO);
                    prop_assert_eq!(item.stock(), expected);
                }
            }
        }
    }
}
