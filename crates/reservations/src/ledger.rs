use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use druggist_core::ReservationId;

use crate::reservation::Reservation;

/// Open reservations keyed by id.
///
/// Closing a reservation removes it; a closed id is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLedger {
    open: BTreeMap<ReservationId, Reservation>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, reservation: Reservation) {
        self.open.insert(reservation.id, reservation);
    }

    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        self.open.get(&id)
    }

    /// Remove and return an open reservation.
    pub fn take(&mut self, id: ReservationId) -> Option<Reservation> {
        self.open.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.open.values()
    }

    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Reservation> {
        self.open.values().filter(move |r| r.matches(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use druggist_core::{Actor, ItemId, Quantity, UserId};
    use rust_decimal::Decimal;

    fn reservation(name: &str, user: &str) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            item_id: ItemId::new(),
            item_name: name.to_string(),
            quantity: Quantity::new(Decimal::ONE).unwrap(),
            client: None,
            locked_by: Actor::new(UserId::new(), user),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn take_closes_reservation_once() {
        let mut ledger = ReservationLedger::new();
        let r = reservation("Insulin", "ada");
        let id = r.id;
        ledger.open(r);

        assert!(ledger.take(id).is_some());
        assert!(ledger.take(id).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_search_returns_everything() {
        let mut ledger = ReservationLedger::new();
        ledger.open(reservation("Insulin", "ada"));
        ledger.open(reservation("Quinine", "grace"));

        assert_eq!(ledger.search("").count(), 2);
        assert_eq!(ledger.search("GRACE").count(), 1);
    }
}
