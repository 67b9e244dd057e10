use std::collections::HashMap;

use crate::error::PipelineError;
use crate::types::{HourlyPoint, HourlySeries, Order, OrderDetail};

use super::calendar::ReferenceYear;
use super::pricing::overflow;

pub const FIRST_HOUR: u32 = 9;
pub const LAST_HOUR: u32 = 24;
pub const HOUR_BUCKETS: usize = (LAST_HOUR - FIRST_HOUR + 1) as usize;

/// Average orders and pizzas per day for each hour bucket 9..=24.
///
/// Counts are divided by the length of the reference year and rounded to
/// two decimals. Orders outside the buckets (01:00 to 08:59) are not reported.
pub fn hourly_series(
    orders: &[Order],
    details: &[OrderDetail],
    year: ReferenceYear,
) -> Result<HourlySeries, PipelineError> {
    let days = year.days() as f64;

    let mut order_counts = [0u64; HOUR_BUCKETS];
    let mut bucket_of: HashMap<u64, usize> = HashMap::with_capacity(orders.len());
    for order in orders {
        if let Some(idx) = bucket_index(order.hour_bucket()) {
            order_counts[idx] += 1;
            bucket_of.insert(order.order_id, idx);
        }
    }

    let mut pizza_counts = [0u64; HOUR_BUCKETS];
    for detail in details {
        if let Some(&idx) = bucket_of.get(&detail.order_id) {
            pizza_counts[idx] = pizza_counts[idx].checked_add(detail.quantity).ok_or_else(|| {
                overflow(format!(
                    "pizza quantity of hour {} overflows",
                    idx as u32 + FIRST_HOUR
                ))
            })?;
        }
    }

    Ok((FIRST_HOUR..=LAST_HOUR)
        .zip(order_counts.iter().zip(pizza_counts.iter()))
        .map(|(hour, (&orders, &pizzas))| HourlyPoint {
            hour,
            avg_orders: round2(orders as f64 / days),
            avg_pizzas: round2(pizzas as f64 / days),
        })
        .collect())
}

fn bucket_index(hour: u32) -> Option<usize> {
    if (FIRST_HOUR..=LAST_HOUR).contains(&hour) {
        Some((hour - FIRST_HOUR) as usize)
    } else {
        None
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
