//! Reshape aggregates into presentation records plus layout hints.
//!
//! Nothing here computes; every number comes from [`Aggregates`]. Layout
//! order is not assigned here, see [`crate::board::Board::assemble`].

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::aggregate::Aggregates;
use crate::types::{HourlyPoint, KpiSet, MonthlyPoint, YearlyPoint};

/// Chart type requested from the presentation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Html,
    Line,
    Indicator,
    Bar,
    Area,
}

/// Size, placement and axis hints for one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutHints {
    pub rows_size: u32,
    pub cols_size: u32,
    /// "top,right,bottom,left" in grid units.
    pub padding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_modifications: Option<serde_json::Value>,
}

impl LayoutHints {
    fn grid(rows_size: u32, cols_size: u32, padding: &str) -> Self {
        Self {
            rows_size,
            cols_size,
            padding: padding.to_string(),
            x: None,
            y: None,
            x_axis_name: None,
            y_axis_name: None,
            option_modifications: None,
        }
    }

    fn axes(mut self, x: &str, y: Option<&str>, x_name: &str, y_name: &str) -> Self {
        self.x = Some(x.to_string());
        self.y = y.map(String::from);
        self.x_axis_name = Some(x_name.to_string());
        self.y_axis_name = Some(y_name.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyRecord {
    pub date: NaiveDate,
    pub order: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorRecord {
    pub title: String,
    pub value: String,
    pub color: String,
    pub align: String,
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRecord {
    pub date: NaiveDate,
    pub sales: String,
    pub orders: String,
}

/// Averages are two-decimal text, like the monthly figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyRecord {
    /// Hour of the day, 9..=24.
    pub date: u32,
    pub pizzas: String,
    pub orders: String,
}

/// Records of one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewData {
    Header(HeaderRecord),
    Yearly(Vec<YearlyRecord>),
    Indicators(Vec<IndicatorRecord>),
    Monthly(Vec<MonthlyRecord>),
    Hourly(Vec<HourlyRecord>),
}

impl ViewData {
    pub fn len(&self) -> usize {
        match self {
            ViewData::Header(_) => 1,
            ViewData::Yearly(r) => r.len(),
            ViewData::Indicators(r) => r.len(),
            ViewData::Monthly(r) => r.len(),
            ViewData::Hourly(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One presentation-ready panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub layout: LayoutHints,
    pub data: ViewData,
}

impl View {
    /// Layout slots the panel occupies. Indicator groups take one per
    /// indicator plus one for the group.
    pub fn slots(&self) -> usize {
        match (&self.kind, &self.data) {
            (ChartKind::Indicator, data) => data.len() + 1,
            _ => 1,
        }
    }
}

/// Page title and subtitle of the overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub subtitle: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            title: "Pizza's Sales Overview".to_string(),
            subtitle: "Pizza sales resume from a fictitious pizza place. The dataset represents \
                       the pizza orders considering the price of each pizza type."
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record reshaping
// ---------------------------------------------------------------------------

pub fn yearly_records(series: &[YearlyPoint]) -> Vec<YearlyRecord> {
    series
        .iter()
        .map(|p| YearlyRecord {
            date: p.date,
            order: p.orders,
        })
        .collect()
}

pub fn indicator_records(kpis: &KpiSet) -> Vec<IndicatorRecord> {
    kpis.pairs()
        .iter()
        .map(|(title, value)| IndicatorRecord {
            title: title.to_string(),
            value: value.to_string(),
            color: "success".to_string(),
            align: "center".to_string(),
            variant: "topColor".to_string(),
        })
        .collect()
}

pub fn monthly_records(series: &[MonthlyPoint]) -> Vec<MonthlyRecord> {
    series
        .iter()
        .map(|p| MonthlyRecord {
            date: p.month_start,
            sales: p.sales_text(),
            orders: p.pizzas_text(),
        })
        .collect()
}

pub fn hourly_records(series: &[HourlyPoint]) -> Vec<HourlyRecord> {
    series
        .iter()
        .map(|p| HourlyRecord {
            date: p.hour,
            pizzas: format!("{:.2}", p.avg_pizzas),
            orders: format!("{:.2}", p.avg_orders),
        })
        .collect()
}

/// All panels of the overview page, in display sequence.
pub fn format_views(agg: &Aggregates, header: &Header) -> Vec<View> {
    let monthly = monthly_records(&agg.monthly);

    vec![
        View {
            kind: ChartKind::Html,
            title: None,
            layout: LayoutHints::grid(1, 10, "0,1,0,1"),
            data: ViewData::Header(HeaderRecord {
                title: header.title.clone(),
                subtitle: header.subtitle.clone(),
            }),
        },
        View {
            kind: ChartKind::Line,
            title: Some(format!("Orders per day over {}", agg.year.year())),
            layout: LayoutHints {
                option_modifications: Some(json!({
                    "dataZoom": { "show": true },
                    "toolbox": { "show": true }
                })),
                ..LayoutHints::grid(2, 10, "0,1,0,1").axes("date", None, "date", "pizza's orders")
            },
            data: ViewData::Yearly(yearly_records(&agg.yearly)),
        },
        View {
            kind: ChartKind::Indicator,
            title: None,
            layout: LayoutHints::grid(1, 10, "0,1,0,1"),
            data: ViewData::Indicators(indicator_records(&agg.kpis)),
        },
        View {
            kind: ChartKind::Bar,
            title: Some("Pizza's sale per month".to_string()),
            layout: LayoutHints::grid(2, 5, "0,0,0,1").axes("date", Some("sales"), "date", "pizza's sales"),
            data: ViewData::Monthly(monthly.clone()),
        },
        View {
            kind: ChartKind::Bar,
            title: Some("Pizza's orders per month".to_string()),
            layout: LayoutHints::grid(2, 5, "0,1,0,0").axes("date", Some("orders"), "date", "pizza's orders"),
            data: ViewData::Monthly(monthly),
        },
        View {
            kind: ChartKind::Area,
            title: Some("Pizza and Order average per hour".to_string()),
            layout: LayoutHints::grid(2, 10, "0,1,0,1").axes("date", None, "hour", "pizza / order"),
            data: ViewData::Hourly(hourly_records(&agg.hourly)),
        },
    ]
}
