use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{Order, YearlyPoint, YearlySeries};

/// Order count per distinct order date, in chronological order.
///
/// An empty orders table gives an empty series.
pub fn yearly_series(orders: &[Order]) -> YearlySeries {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for order in orders {
        *per_day.entry(order.date).or_default() += 1;
    }

    per_day
        .into_iter()
        .map(|(date, orders)| YearlyPoint { date, orders })
        .collect()
}
