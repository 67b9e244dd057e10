//! Price lookup and integer-cent sales arithmetic shared by the KPI and
//! monthly aggregations.

use std::collections::{BTreeMap, HashMap};

use crate::data::TableId;
use crate::error::PipelineError;
use crate::types::{Cents, OrderDetail, Pizza};

/// pizza_id → price, built once from the pizzas table.
#[derive(Debug)]
pub struct PriceIndex<'a> {
    /// price of the first row seen, and how many rows carry this id
    entries: HashMap<&'a str, (Cents, usize)>,
}

impl<'a> PriceIndex<'a> {
    pub fn new(pizzas: &'a [Pizza]) -> Self {
        let mut entries: HashMap<&'a str, (Cents, usize)> = HashMap::with_capacity(pizzas.len());
        for pizza in pizzas {
            entries
                .entry(pizza.pizza_id.as_str())
                .and_modify(|(_, n)| *n += 1)
                .or_insert((pizza.price, 1));
        }
        Self { entries }
    }

    /// Price of a pizza_id. Exactly one row must match.
    pub fn lookup(&self, pizza_id: &str) -> Result<Cents, PipelineError> {
        match self.entries.get(pizza_id) {
            Some((price, 1)) => Ok(*price),
            Some((_, n)) => Err(PipelineError::PriceLookup {
                pizza_id: pizza_id.to_string(),
                matches: *n,
            }),
            None => Err(PipelineError::PriceLookup {
                pizza_id: pizza_id.to_string(),
                matches: 0,
            }),
        }
    }
}

/// Sum quantities per pizza_id. Keys come back sorted.
pub fn quantities_by_pizza<'a, I>(details: I) -> Result<BTreeMap<&'a str, u64>, PipelineError>
where
    I: IntoIterator<Item = &'a OrderDetail>,
{
    let mut grouped: BTreeMap<&'a str, u64> = BTreeMap::new();
    for detail in details {
        let slot = grouped.entry(detail.pizza_id.as_str()).or_default();
        *slot = slot.checked_add(detail.quantity).ok_or_else(|| {
            overflow(format!("quantity of pizza_id '{}' overflows", detail.pizza_id))
        })?;
    }
    Ok(grouped)
}

/// Sum of quantities over all given lines.
pub fn total_quantity<'a, I>(details: I) -> Result<u64, PipelineError>
where
    I: IntoIterator<Item = &'a OrderDetail>,
{
    details.into_iter().try_fold(0u64, |acc, d| {
        acc.checked_add(d.quantity)
            .ok_or_else(|| overflow("total pizza quantity overflows".to_string()))
    })
}

/// Σ quantity × price over grouped quantities, in cents.
///
/// Fails on the first pizza_id (in sorted order) without exactly one price,
/// or whose sales do not fit in cents.
pub fn sales(quantities: &BTreeMap<&str, u64>, prices: &PriceIndex<'_>) -> Result<Cents, PipelineError> {
    let mut total = Cents::ZERO;
    for (pizza_id, quantity) in quantities {
        total = prices
            .lookup(pizza_id)?
            .checked_times(*quantity)
            .and_then(|amount| total.checked_add(amount))
            .ok_or_else(|| overflow(format!("sales of pizza_id '{}' overflow", pizza_id)))?;
    }
    Ok(total)
}

pub(crate) fn overflow(reason: String) -> PipelineError {
    PipelineError::malformed(TableId::OrderDetails.name(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza(id: &str, price: i64) -> Pizza {
        Pizza {
            pizza_id: id.to_string(),
            pizza_type_id: String::new(),
            size: String::new(),
            price: Cents(price),
        }
    }

    fn detail(order_id: u64, pizza_id: &str, quantity: u64) -> OrderDetail {
        OrderDetail {
            order_details_id: None,
            order_id,
            pizza_id: pizza_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_lookup_exact_match() {
        let pizzas = vec![pizza("A", 950), pizza("B", 1325)];
        let index = PriceIndex::new(&pizzas);
        assert_eq!(index.lookup("A").unwrap(), Cents(950));
        assert_eq!(index.lookup("B").unwrap(), Cents(1325));
    }

    #[test]
    fn test_lookup_missing_id() {
        let pizzas = vec![pizza("A", 950)];
        let index = PriceIndex::new(&pizzas);
        match index.lookup("B") {
            Err(PipelineError::PriceLookup { pizza_id, matches }) => {
                assert_eq!(pizza_id, "B");
                assert_eq!(matches, 0);
            }
            other => panic!("expected PriceLookup, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_duplicate_id() {
        let pizzas = vec![pizza("A", 950), pizza("A", 1000), pizza("A", 1100)];
        let index = PriceIndex::new(&pizzas);
        assert!(matches!(
            index.lookup("A"),
            Err(PipelineError::PriceLookup { matches: 3, .. })
        ));
    }

    #[test]
    fn test_quantities_grouped_and_sorted() {
        let details = vec![detail(1, "B", 1), detail(1, "A", 2), detail(2, "B", 3)];
        let grouped = quantities_by_pizza(&details).unwrap();
        let items: Vec<(&str, u64)> = grouped.into_iter().collect();
        assert_eq!(items, vec![("A", 2), ("B", 4)]);
    }

    #[test]
    fn test_sales_in_cents() {
        // 3 × 20.75 + 2 × 12.50 = 62.25 + 25.00 = 87.25
        let pizzas = vec![pizza("big", 2075), pizza("small", 1250)];
        let index = PriceIndex::new(&pizzas);
        let details = vec![detail(1, "big", 2), detail(2, "big", 1), detail(2, "small", 2)];
        let total = sales(&quantities_by_pizza(&details).unwrap(), &index).unwrap();
        assert_eq!(total, Cents(8725));
    }

    #[test]
    fn test_sales_of_nothing_is_zero() {
        let pizzas: Vec<Pizza> = vec![];
        let index = PriceIndex::new(&pizzas);
        assert_eq!(sales(&BTreeMap::new(), &index).unwrap(), Cents::ZERO);
    }

    #[test]
    fn test_sales_reports_first_missing_id_in_sorted_order() {
        let pizzas = vec![pizza("A", 100)];
        let index = PriceIndex::new(&pizzas);
        let details = vec![detail(1, "Z", 1), detail(1, "M", 1), detail(1, "A", 1)];
        match sales(&quantities_by_pizza(&details).unwrap(), &index) {
            Err(PipelineError::PriceLookup { pizza_id, .. }) => assert_eq!(pizza_id, "M"),
            other => panic!("expected PriceLookup, got {:?}", other),
        }
    }

    fn overflow_reason(err: PipelineError) -> String {
        match err {
            PipelineError::MalformedTable { table, reason } => {
                assert_eq!(table, "order_details");
                reason
            }
            other => panic!("expected MalformedTable, got {:?}", other),
        }
    }

    #[test]
    fn test_sales_overflow_names_pizza() {
        let pizzas = vec![pizza("A", 1), pizza("B", 950)];
        let index = PriceIndex::new(&pizzas);

        // Quantity beyond i64::MAX at one cent.
        let details = vec![detail(1, "A", 1 << 63)];
        let err = sales(&quantities_by_pizza(&details).unwrap(), &index).unwrap_err();
        assert!(overflow_reason(err).contains("'A'"));

        // Quantity that fits, product that does not.
        let details = vec![detail(1, "B", 100_000_000_000_000_000)];
        let err = sales(&quantities_by_pizza(&details).unwrap(), &index).unwrap_err();
        assert!(overflow_reason(err).contains("'B'"));
    }

    #[test]
    fn test_quantity_sums_are_checked() {
        let details = vec![detail(1, "A", u64::MAX), detail(2, "A", 1)];
        let err = quantities_by_pizza(&details).unwrap_err();
        assert!(overflow_reason(err).contains("'A'"));

        let details = vec![detail(1, "A", u64::MAX), detail(2, "B", 1)];
        assert!(total_quantity(&details).is_err());
        assert_eq!(total_quantity(&details[1..]).unwrap(), 1);
    }
}
