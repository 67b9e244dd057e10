//! Row types for the four input tables and the derived views.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A monetary amount in integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Convert a decimal price (e.g. `9.5`) to cents.
    ///
    /// Returns `None` for non-finite or negative prices.
    pub fn from_price(price: f64) -> Option<Cents> {
        if !price.is_finite() || price < 0.0 {
            return None;
        }
        let cents = (price * 100.0).round();
        if cents > i64::MAX as f64 {
            return None;
        }
        Some(Cents(cents as i64))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Round half away from zero to whole currency units.
    pub fn round_units(&self) -> i64 {
        let units = self.0 / 100;
        let rem = self.0 % 100;
        if rem >= 50 {
            units + 1
        } else if rem <= -50 {
            units - 1
        } else {
            units
        }
    }

    /// `quantity` × self, or `None` when the product does not fit in cents.
    pub fn checked_times(&self, quantity: u64) -> Option<Cents> {
        let quantity = i64::try_from(quantity).ok()?;
        self.0.checked_mul(quantity).map(Cents)
    }

    pub fn checked_add(&self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }
}

impl std::ops::Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, |acc, c| acc + c)
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

/// One order (one row of `orders.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// `date` and `time` combined.
    pub ordered_at: NaiveDateTime,
}

impl Order {
    /// Hour bucket of the order: 0..=23, except midnight which is reported as 24.
    pub fn hour_bucket(&self) -> u32 {
        match self.ordered_at.hour() {
            0 => 24,
            h => h,
        }
    }
}

/// One order line item (one row of `order_details.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order_details_id: Option<u64>,
    pub order_id: u64,
    pub pizza_id: String,
    pub quantity: u64,
}

/// Descriptive pizza type row. Loaded for completeness; no view reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaType {
    pub pizza_type_id: String,
    pub name: String,
    pub category: String,
    pub ingredients: String,
}

/// A pizza variant and its price (one row of `pizzas.csv`).
#[derive(Debug, Clone, PartialEq)]
pub struct Pizza {
    pub pizza_id: String,
    pub pizza_type_id: String,
    pub size: String,
    pub price: Cents,
}

/// The four tables, loaded once and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub orders: Vec<Order>,
    pub order_details: Vec<OrderDetail>,
    pub pizza_types: Vec<PizzaType>,
    pub pizzas: Vec<Pizza>,
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Order count for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyPoint {
    pub date: NaiveDate,
    pub orders: u64,
}

/// Chronological order counts, one per distinct order date.
pub type YearlySeries = Vec<YearlyPoint>;

/// Headline totals and per-day averages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSet {
    pub total_sales: Cents,
    pub total_pizzas: u64,
    pub total_orders: u64,
    pub avg_pizzas_per_day: u64,
    pub avg_orders_per_day: u64,
}

impl KpiSet {
    pub const LABELS: [&'static str; 5] = [
        "Total Sales",
        "Total Pizzas",
        "Total Orders",
        "Avg. Pizzas/day",
        "Avg. Orders/day",
    ];

    /// The five (label, value) pairs in display order.
    ///
    /// Total sales is rounded to whole units here.
    pub fn pairs(&self) -> [(&'static str, i64); 5] {
        [
            (Self::LABELS[0], self.total_sales.round_units()),
            (Self::LABELS[1], self.total_pizzas as i64),
            (Self::LABELS[2], self.total_orders as i64),
            (Self::LABELS[3], self.avg_pizzas_per_day as i64),
            (Self::LABELS[4], self.avg_orders_per_day as i64),
        ]
    }
}

/// Sales and pizza quantity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month_start: NaiveDate,
    pub sales: Cents,
    /// Sum of order-line quantities.
    pub pizzas: u64,
}

impl MonthlyPoint {
    pub fn sales_text(&self) -> String {
        self.sales.to_string()
    }

    pub fn pizzas_text(&self) -> String {
        self.pizzas.to_string()
    }
}

/// Always 12 points, January first.
pub type MonthlySeries = Vec<MonthlyPoint>;

/// Average orders and pizzas per day for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u32,
    pub avg_orders: f64,
    pub avg_pizzas: f64,
}

/// Always 16 points, hours 9 through 24.
pub type HourlySeries = Vec<HourlyPoint>;

#[cfg(test)]
mod tests {
    use super::*;

    fn order_at(time: &str) -> Order {
        let date = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
        Order {
            order_id: 1,
            date,
            time,
            ordered_at: date.and_time(time),
        }
    }

    #[test]
    fn test_cents_from_price_rounds_binary_noise() {
        // 0.29 * 100 = 28.999999999999996 in f64
        assert_eq!(Cents::from_price(0.29), Some(Cents(29)));
        assert_eq!(Cents::from_price(20.75), Some(Cents(2075)));
        assert_eq!(Cents::from_price(9.5), Some(Cents(950)));
        assert_eq!(Cents::from_price(0.0), Some(Cents(0)));
    }

    #[test]
    fn test_cents_from_price_rejects_bad_values() {
        assert_eq!(Cents::from_price(-1.0), None);
        assert_eq!(Cents::from_price(f64::NAN), None);
        assert_eq!(Cents::from_price(f64::INFINITY), None);
    }

    #[test]
    fn test_cents_display() {
        assert_eq!(Cents(1900).to_string(), "19.00");
        assert_eq!(Cents(5).to_string(), "0.05");
        assert_eq!(Cents(81786005).to_string(), "817860.05");
        assert_eq!(Cents(-250).to_string(), "-2.50");
    }

    #[test]
    fn test_cents_round_units() {
        assert_eq!(Cents(1949).round_units(), 19);
        assert_eq!(Cents(1950).round_units(), 20);
        assert_eq!(Cents(1900).round_units(), 19);
        assert_eq!(Cents(-1950).round_units(), -20);
    }

    #[test]
    fn test_cents_checked_arithmetic() {
        assert_eq!(Cents(950).checked_times(2), Some(Cents(1900)));
        assert_eq!(Cents(1).checked_times(u64::MAX), None);
        assert_eq!(Cents(1).checked_times(1 << 63), None);
        assert_eq!(Cents(950).checked_times(100_000_000_000_000_000), None);
        assert_eq!(Cents(i64::MAX).checked_add(Cents(1)), None);
        assert_eq!(Cents(5).checked_add(Cents(7)), Some(Cents(12)));
    }

    #[test]
    fn test_hour_bucket_midnight_is_24() {
        assert_eq!(order_at("00:15:00").hour_bucket(), 24);
        assert_eq!(order_at("09:00:00").hour_bucket(), 9);
        assert_eq!(order_at("23:59:59").hour_bucket(), 23);
    }

    #[test]
    fn test_kpi_pairs_order_and_rounding() {
        let kpis = KpiSet {
            total_sales: Cents(81786005),
            total_pizzas: 49574,
            total_orders: 21350,
            avg_pizzas_per_day: 135,
            avg_orders_per_day: 58,
        };
        let pairs = kpis.pairs();
        assert_eq!(pairs[0], ("Total Sales", 817860));
        assert_eq!(pairs[1], ("Total Pizzas", 49574));
        assert_eq!(pairs[2], ("Total Orders", 21350));
        assert_eq!(pairs[3], ("Avg. Pizzas/day", 135));
        assert_eq!(pairs[4], ("Avg. Orders/day", 58));
    }
}
