//! The four derived views computed from the loaded tables.
//!
//! Every aggregation is a pure function of immutable tables, so calling one
//! twice on the same input yields identical output.

pub mod calendar;
pub mod hourly;
pub mod kpi;
pub mod monthly;
pub mod pricing;
pub mod yearly;

pub use calendar::ReferenceYear;
pub use hourly::hourly_series;
pub use kpi::compute_kpis;
pub use monthly::monthly_series;
pub use yearly::yearly_series;

use tracing::info;

use crate::error::{PipelineError, ViewKind};
use crate::types::{HourlySeries, KpiSet, MonthlySeries, Tables, YearlySeries};

/// All derived views of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub year: ReferenceYear,
    pub yearly: YearlySeries,
    pub kpis: KpiSet,
    pub monthly: MonthlySeries,
    pub hourly: HourlySeries,
}

/// Compute every view. The reference year is derived from the orders unless given.
///
/// Any failure aborts the whole computation and names the view it came from.
pub fn compute_all(
    tables: &Tables,
    year: Option<ReferenceYear>,
) -> Result<Aggregates, PipelineError> {
    let year = match year {
        Some(y) => y,
        None => {
            ReferenceYear::from_orders(&tables.orders).map_err(|e| e.in_view(ViewKind::Kpis))?
        }
    };
    info!(year = year.year(), days = year.days(), "aggregating");

    let yearly = yearly_series(&tables.orders);
    let kpis = compute_kpis(&tables.orders, &tables.order_details, &tables.pizzas, year)
        .map_err(|e| e.in_view(ViewKind::Kpis))?;
    let monthly = monthly_series(&tables.orders, &tables.order_details, &tables.pizzas, year)
        .map_err(|e| e.in_view(ViewKind::Monthly))?;
    let hourly = hourly_series(&tables.orders, &tables.order_details, year)
        .map_err(|e| e.in_view(ViewKind::Hourly))?;

    info!(
        days_with_orders = yearly.len(),
        total_orders = kpis.total_orders,
        total_sales = %kpis.total_sales,
        "aggregation complete"
    );

    Ok(Aggregates {
        year,
        yearly,
        kpis,
        monthly,
        hourly,
    })
}
