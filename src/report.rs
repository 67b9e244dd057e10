use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::Aggregates;
use crate::types::Cents;
use crate::views::{hourly_records, monthly_records, yearly_records};

/// Plain-text summary computed from one run's aggregates.
#[derive(Debug, Clone)]
pub struct Report {
    pub year: i32,
    pub days_in_year: u32,

    // Totals
    pub total_sales: Cents,
    pub total_pizzas: u64,
    pub total_orders: u64,
    pub avg_pizzas_per_day: u64,
    pub avg_orders_per_day: u64,
    pub avg_pizzas_per_order: f64,

    // Highlights
    pub days_with_orders: usize,
    pub busiest_day: Option<(NaiveDate, u64)>,
    pub best_month: Option<(NaiveDate, Cents)>,
    pub peak_hour: Option<(u32, f64)>,
}

#[derive(Debug, Serialize)]
struct KpiRow<'a> {
    title: &'a str,
    value: i64,
}

impl Report {
    pub fn from_aggregates(agg: &Aggregates) -> Self {
        let kpis = &agg.kpis;

        let avg_pizzas_per_order = if kpis.total_orders > 0 {
            kpis.total_pizzas as f64 / kpis.total_orders as f64
        } else {
            0.0
        };

        // Ties go to the earliest entry.
        let busiest_day = agg
            .yearly
            .iter()
            .fold(None, |best: Option<(NaiveDate, u64)>, p| match best {
                Some((_, n)) if n >= p.orders => best,
                _ => Some((p.date, p.orders)),
            });
        let best_month = agg
            .monthly
            .iter()
            .filter(|m| m.sales > Cents::ZERO)
            .fold(None, |best: Option<(NaiveDate, Cents)>, m| match best {
                Some((_, s)) if s >= m.sales => best,
                _ => Some((m.month_start, m.sales)),
            });
        let peak_hour = agg
            .hourly
            .iter()
            .filter(|h| h.avg_orders > 0.0)
            .fold(None, |best: Option<(u32, f64)>, h| match best {
                Some((_, a)) if a >= h.avg_orders => best,
                _ => Some((h.hour, h.avg_orders)),
            });

        Self {
            year: agg.year.year(),
            days_in_year: agg.year.days(),
            total_sales: kpis.total_sales,
            total_pizzas: kpis.total_pizzas,
            total_orders: kpis.total_orders,
            avg_pizzas_per_day: kpis.avg_pizzas_per_day,
            avg_orders_per_day: kpis.avg_orders_per_day,
            avg_pizzas_per_order,
            days_with_orders: agg.yearly.len(),
            busiest_day,
            best_month,
            peak_hour,
        }
    }

    /// Print a formatted text report to stdout.
    pub fn print(&self) {
        println!();
        println!("{}", "=".repeat(55));
        println!("  Pizza Sales Report: {} ({} days)", self.year, self.days_in_year);
        println!("{}", "=".repeat(55));
        println!();
        println!("  Total sales:     {}", self.total_sales);
        println!("  Total pizzas:    {}", self.total_pizzas);
        println!("  Total orders:    {}", self.total_orders);
        println!("  Pizzas/order:    {:.2}", self.avg_pizzas_per_order);

        println!();
        println!("  --- Per day {}", "-".repeat(41));
        println!("  Avg. pizzas/day: {}", self.avg_pizzas_per_day);
        println!("  Avg. orders/day: {}", self.avg_orders_per_day);
        println!(
            "  Days open:       {}    ({:.1}% of the year)",
            self.days_with_orders,
            self.days_with_orders as f64 / self.days_in_year as f64 * 100.0
        );

        println!();
        println!("  --- Highlights {}", "-".repeat(38));
        match self.busiest_day {
            Some((date, n)) => println!("  Busiest day:     {}  ({} orders)", date, n),
            None => println!("  Busiest day:     -"),
        }
        match self.best_month {
            Some((date, sales)) => println!("  Best month:      {}  ({})", date.format("%B"), sales),
            None => println!("  Best month:      -"),
        }
        match self.peak_hour {
            Some((hour, avg)) => println!("  Peak hour:       {:02}:00  ({:.2} orders/day)", hour, avg),
            None => println!("  Peak hour:       -"),
        }

        println!();
        println!("{}", "=".repeat(55));
        println!();
    }

    /// Write one CSV file per view into `dir`. Returns the written paths.
    pub fn export_csv(agg: &Aggregates, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export dir {}", dir.display()))?;

        let kpi_rows: Vec<KpiRow<'_>> = agg
            .kpis
            .pairs()
            .iter()
            .map(|&(title, value)| KpiRow { title, value })
            .collect();

        Ok(vec![
            write_csv(&dir.join("yearly_orders.csv"), &yearly_records(&agg.yearly))?,
            write_csv(&dir.join("kpis.csv"), &kpi_rows)?,
            write_csv(&dir.join("monthly_sales.csv"), &monthly_records(&agg.monthly))?,
            write_csv(&dir.join("hourly_averages.csv"), &hourly_records(&agg.hourly))?,
        ])
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV at {}", path.display()))?;

    for (i, row) in rows.iter().enumerate() {
        wtr.serialize(row)
            .with_context(|| format!("failed to write CSV row {} of {}", i + 1, path.display()))?;
    }

    wtr.flush().context("failed to flush CSV")?;
    Ok(path.to_path_buf())
}
