//! Read-side aggregates over sales.
//!
//! Sales carry no price information, so only quantities are aggregated.
//! Revenue and profit are reported as [`DomainError::PricingUnavailable`]
//! instead of being derived from a guessed price model.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use druggist_core::{DomainError, DomainResult};

use crate::sale::Sale;

/// Count and volume of a set of sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sale_count: usize,
    pub total_quantity: Decimal,
}

impl SalesSummary {
    /// Fails with `InvalidQuantity` when the total volume leaves the decimal range.
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> DomainResult<Self> {
        let mut acc = Self::default();
        for sale in sales {
            acc.sale_count += 1;
            acc.total_quantity = add_volume(acc.total_quantity, sale.quantity.value())?;
        }
        Ok(acc)
    }

    /// Always `PricingUnavailable`: sales record no sale or buying price.
    pub fn revenue(&self) -> DomainResult<Decimal> {
        Err(DomainError::PricingUnavailable)
    }

    /// Always `PricingUnavailable`: sales record no sale or buying price.
    pub fn profit(&self) -> DomainResult<Decimal> {
        Err(DomainError::PricingUnavailable)
    }
}

/// Total quantity sold under one item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSeller {
    pub item_name: String,
    pub total_quantity: Decimal,
}

/// Best-selling item names by total quantity, highest first.
///
/// `lines` pairs an item name with a sold quantity; lines sharing a name are
/// summed. Callers pass the item's current name rather than the snapshot on
/// [`Sale::item_name`], so a renamed item stays one row. Ties are broken by
/// name so the result is deterministic.
pub fn top_sellers<N: AsRef<str>>(
    lines: impl IntoIterator<Item = (N, Decimal)>,
    limit: usize,
) -> DomainResult<Vec<TopSeller>> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (name, quantity) in lines {
        let total = totals.entry(name.as_ref().to_string()).or_default();
        *total = add_volume(*total, quantity)?;
    }

    let mut ranked: Vec<TopSeller> = totals
        .into_iter()
        .map(|(item_name, total_quantity)| TopSeller {
            item_name,
            total_quantity,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

fn add_volume(total: Decimal, quantity: Decimal) -> DomainResult<Decimal> {
    total
        .checked_add(quantity)
        .ok_or_else(|| DomainError::invalid_quantity("sales volume overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use druggist_core::{Actor, ItemId, Quantity, SaleId, UserId};
    use proptest::prelude::*;

    fn sale(name: &str, qty: i64) -> Sale {
        Sale {
            id: SaleId::new(),
            item_id: ItemId::new(),
            item_name: name.to_string(),
            batch_no: "B-1".to_string(),
            quantity: Quantity::new(Decimal::from(qty)).unwrap(),
            client: None,
            remaining_quantity: Decimal::ZERO,
            actor: Actor::new(UserId::new(), "pharmacist"),
            occurred_at: Utc::now(),
        }
    }

    fn lines(sales: &[Sale]) -> impl Iterator<Item = (&str, Decimal)> {
        sales
            .iter()
            .map(|s| (s.item_name.as_str(), s.quantity.value()))
    }

    #[test]
    fn top_sellers_groups_by_name_and_ranks_descending() {
        let sales = vec![
            sale("Amoxicillin", 3),
            sale("Paracetamol", 5),
            sale("Amoxicillin", 4),
            sale("Insulin", 1),
        ];

        let top = top_sellers(lines(&sales), 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].item_name, "Amoxicillin");
        assert_eq!(top[0].total_quantity, Decimal::from(7));
        assert_eq!(top[1].item_name, "Paracetamol");
    }

    #[test]
    fn profit_reports_missing_pricing() {
        let summary = SalesSummary::from_sales(&[sale("Insulin", 2)]).unwrap();
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.profit(), Err(DomainError::PricingUnavailable));
        assert_eq!(summary.revenue(), Err(DomainError::PricingUnavailable));
    }

    #[test]
    fn volume_past_decimal_range_is_an_error() {
        let mut big = sale("Insulin", 1);
        big.quantity = Quantity::new(Decimal::MAX).unwrap();
        let sales = vec![big, sale("Insulin", 1)];

        let overflow = DomainError::invalid_quantity("sales volume overflow");
        assert_eq!(SalesSummary::from_sales(&sales), Err(overflow.clone()));
        assert_eq!(top_sellers(lines(&sales), 5), Err(overflow));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: grouping by item never loses or invents volume.
        #[test]
        fn top_sellers_preserve_total_volume(
            lines in prop::collection::vec((0usize..4, 1i64..500), 1..30)
        ) {
            let names = ["Amoxicillin", "Insulin", "Paracetamol", "Quinine"];
            let sales: Vec<Sale> = lines.iter().map(|(n, q)| sale(names[*n], *q)).collect();

            let summary = SalesSummary::from_sales(&sales).unwrap();
            let grouped: Decimal = top_sellers(self::lines(&sales), names.len())
                .unwrap()
                .iter()
                .map(|t| t.total_quantity)
                .sum();

            prop_assert_eq!(summary.sale_count, sales.len());
            prop_assert_eq!(grouped, summary.total_quantity);
        }
    }
}
