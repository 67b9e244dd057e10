use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::error::PipelineError;
use crate::types::Order;

/// The year whose length normalizes the per-day averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceYear {
    year: i32,
    days: u32,
    month_starts: [NaiveDate; 12],
}

impl ReferenceYear {
    /// `None` when the year is outside chrono's calendar range.
    pub fn new(year: i32) -> Option<Self> {
        let last_day = NaiveDate::from_ymd_opt(year, 12, 31)?;
        let mut month_starts = [NaiveDate::MIN; 12];
        for (i, start) in month_starts.iter_mut().enumerate() {
            *start = NaiveDate::from_ymd_opt(year, i as u32 + 1, 1)?;
        }
        Some(Self {
            year,
            days: last_day.ordinal(),
            month_starts,
        })
    }

    /// Year of the latest order date.
    pub fn from_orders(orders: &[Order]) -> Result<Self, PipelineError> {
        let first = orders.iter().map(|o| o.date.year()).min();
        let last = orders.iter().map(|o| o.date.year()).max();

        let (first, last) = match (first, last) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(PipelineError::empty(
                    "orders",
                    "no order dates to derive the reference year from",
                ))
            }
        };

        if first != last {
            warn!(
                first_year = first,
                last_year = last,
                "orders span several years; averaging over {}",
                last
            );
        }

        Self::new(last).ok_or_else(|| {
            PipelineError::malformed("orders", format!("year {} is out of range", last))
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Number of days in the year (365 or 366).
    pub fn days(&self) -> u32 {
        self.days
    }

    /// First day of `month` (1..=12).
    pub fn month_start(&self, month: u32) -> Option<NaiveDate> {
        let idx = month.checked_sub(1)? as usize;
        self.month_starts.get(idx).copied()
    }
}
