use std::collections::HashMap;

use chrono::Datelike;
use tracing::debug;

use crate::error::PipelineError;
use crate::types::{Cents, MonthlyPoint, MonthlySeries, Order, OrderDetail, Pizza};

use super::calendar::ReferenceYear;
use super::pricing::{overflow, quantities_by_pizza, sales, PriceIndex};

/// Sales and pizza quantity per calendar month, January through December.
///
/// Orders are bucketed by the month of their date; line items follow their
/// order. Line items whose order_id is not in `orders` are left out. Months
/// without orders report zero sales and zero pizzas.
pub fn monthly_series(
    orders: &[Order],
    details: &[OrderDetail],
    pizzas: &[Pizza],
    year: ReferenceYear,
) -> Result<MonthlySeries, PipelineError> {
    let prices = PriceIndex::new(pizzas);

    let month_of: HashMap<u64, u32> = orders
        .iter()
        .map(|o| (o.order_id, o.date.month()))
        .collect();

    let mut per_month: Vec<Vec<&OrderDetail>> = vec![Vec::new(); 12];
    for detail in details {
        if let Some(month) = month_of.get(&detail.order_id) {
            per_month[*month as usize - 1].push(detail);
        }
    }

    let mut series = Vec::with_capacity(12);
    for (idx, month_details) in per_month.into_iter().enumerate() {
        let month = idx as u32 + 1;
        let month_start = year.month_start(month).ok_or_else(|| {
            PipelineError::malformed("orders", format!("month {} has no first day", month))
        })?;

        let quantities = quantities_by_pizza(month_details)?;
        let month_sales: Cents = sales(&quantities, &prices)?;
        let month_pizzas = quantities
            .values()
            .try_fold(0u64, |acc, q| acc.checked_add(*q))
            .ok_or_else(|| overflow(format!("pizza quantity of month {} overflows", month)))?;

        debug!(month, sales = %month_sales, pizzas = month_pizzas, "month aggregated");
        series.push(MonthlyPoint {
            month_start,
            sales: month_sales,
            pizzas: month_pizzas,
        });
    }

    Ok(series)
}
