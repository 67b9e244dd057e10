use tracing::debug;

use crate::error::PipelineError;
use crate::types::{KpiSet, Order, OrderDetail, Pizza};

use super::calendar::ReferenceYear;
use super::pricing::{quantities_by_pizza, sales, total_quantity, PriceIndex};

/// Headline totals over the whole dataset.
///
/// Total sales covers every order line, priced through `pizzas`. The per-day
/// averages are floor divisions by the length of the reference year.
pub fn compute_kpis(
    orders: &[Order],
    details: &[OrderDetail],
    pizzas: &[Pizza],
    year: ReferenceYear,
) -> Result<KpiSet, PipelineError> {
    if orders.is_empty() {
        return Err(PipelineError::empty(
            "orders",
            "KPIs need at least one order",
        ));
    }

    let prices = PriceIndex::new(pizzas);
    let total_sales = sales(&quantities_by_pizza(details)?, &prices)?;

    let total_pizzas = total_quantity(details)?;
    let total_orders = orders.len() as u64;
    let days = year.days() as u64;

    let kpis = KpiSet {
        total_sales,
        total_pizzas,
        total_orders,
        avg_pizzas_per_day: total_pizzas / days,
        avg_orders_per_day: total_orders / days,
    };
    debug!(
        total_sales = %kpis.total_sales,
        total_pizzas,
        total_orders,
        days,
        "computed KPIs"
    );
    Ok(kpis)
}
