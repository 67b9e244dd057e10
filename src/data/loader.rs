//! Decode raw CSV text into typed tables.
//!
//! Every table is validated against its required columns. Tables with
//! temporal columns (names containing `date` or `time`) must carry both `date`
//! and `time`; each temporal column is parsed on every row, and the two are
//! combined into a single timestamp.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use tracing::info;

use crate::error::PipelineError;
use crate::types::{Cents, Order, OrderDetail, Pizza, PizzaType, Tables};

use super::schema::{self, TableId};
use super::source::TableSource;

/// Load and decode all four tables.
pub fn load_tables(source: &dyn TableSource) -> Result<Tables, PipelineError> {
    let mut tables = Tables::default();

    for table in TableId::ALL {
        let text = source.read(table)?;
        let raw = RawTable::parse(table, &text)?;
        match table {
            TableId::OrderDetails => tables.order_details = decode_order_details(&raw)?,
            TableId::Orders => tables.orders = decode_orders(&raw)?,
            TableId::PizzaTypes => tables.pizza_types = decode_pizza_types(&raw)?,
            TableId::Pizzas => tables.pizzas = decode_pizzas(&raw)?,
        }
        info!(table = table.name(), rows = raw.rows.len(), "loaded table");
    }

    Ok(tables)
}

// ---------------------------------------------------------------------------
// Raw CSV
// ---------------------------------------------------------------------------

/// Header-validated CSV records of one table.
struct RawTable {
    table: TableId,
    columns: HashMap<String, usize>,
    temporal: Vec<String>,
    /// (1-based line number, record)
    rows: Vec<(u64, StringRecord)>,
}

impl RawTable {
    fn parse(table: TableId, text: &str) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::malformed(table.name(), format!("bad header row: {}", e)))?
            .clone();

        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i))
            .collect();

        for col in table.required_columns() {
            if !columns.contains_key(*col) {
                return Err(PipelineError::malformed(
                    table.name(),
                    format!("missing required column '{}'", col),
                ));
            }
        }

        let temporal: Vec<String> = headers
            .iter()
            .filter(|h| schema::is_temporal_column(h))
            .map(String::from)
            .collect();
        if !temporal.is_empty() {
            for col in ["date", "time"] {
                if !columns.contains_key(col) {
                    return Err(PipelineError::malformed(
                        table.name(),
                        format!(
                            "has temporal columns [{}] but no '{}' column to build a timestamp",
                            temporal.join(", "),
                            col
                        ),
                    ));
                }
            }
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                PipelineError::malformed(table.name(), format!("CSV error at record {}: {}", i + 1, e))
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
            rows.push((line, record));
        }

        Ok(Self {
            table,
            columns,
            temporal,
            rows,
        })
    }

    fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |(line, record)| Row {
            raw: self,
            line: *line,
            record,
        })
    }
}

/// One record with typed field accessors.
struct Row<'a> {
    raw: &'a RawTable,
    line: u64,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn error(&self, column: &str, value: &str, expected: &str) -> PipelineError {
        PipelineError::malformed(
            self.raw.table.name(),
            format!(
                "line {}: column '{}' has value '{}', expected {}",
                self.line, column, value, expected
            ),
        )
    }

    fn field(&self, column: &str) -> Result<&'a str, PipelineError> {
        self.raw
            .columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .ok_or_else(|| {
                PipelineError::malformed(
                    self.raw.table.name(),
                    format!("line {}: missing field '{}'", self.line, column),
                )
            })
    }

    fn optional_field(&self, column: &str) -> Option<&'a str> {
        self.raw
            .columns
            .get(column)
            .and_then(|&i| self.record.get(i))
    }

    fn non_empty(&self, column: &str) -> Result<String, PipelineError> {
        let value = self.field(column)?;
        if value.is_empty() {
            return Err(self.error(column, value, "a non-empty value"));
        }
        Ok(value.to_string())
    }

    fn unsigned(&self, column: &str) -> Result<u64, PipelineError> {
        let value = self.field(column)?;
        value
            .parse::<u64>()
            .map_err(|_| self.error(column, value, "a non-negative integer"))
    }

    fn price(&self, column: &str) -> Result<Cents, PipelineError> {
        let value = self.field(column)?;
        value
            .parse::<f64>()
            .ok()
            .and_then(Cents::from_price)
            .ok_or_else(|| self.error(column, value, "a non-negative decimal price"))
    }

    /// Parse every temporal column and return the combined `date time` timestamp.
    fn timestamp(&self) -> Result<Option<NaiveDateTime>, PipelineError> {
        if self.raw.temporal.is_empty() {
            return Ok(None);
        }

        for column in &self.raw.temporal {
            let value = self.field(column)?;
            if column.contains("date") {
                NaiveDate::parse_from_str(value, schema::DATE_FORMAT)
                    .map_err(|_| self.error(column, value, "a YYYY-MM-DD date"))?;
            } else {
                NaiveTime::parse_from_str(value, schema::TIME_FORMAT)
                    .map_err(|_| self.error(column, value, "an HH:MM:SS time"))?;
            }
        }

        let date = self.field("date")?;
        let time = self.field("time")?;
        let combined = format!("{} {}", date, time);
        NaiveDateTime::parse_from_str(&combined, schema::TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| self.error("date time", &combined, "a YYYY-MM-DD HH:MM:SS timestamp"))
    }
}

// ---------------------------------------------------------------------------
// Typed decoding
// ---------------------------------------------------------------------------

fn decode_orders(raw: &RawTable) -> Result<Vec<Order>, PipelineError> {
    let mut seen = HashSet::new();
    let mut orders = Vec::with_capacity(raw.rows.len());

    for row in raw.rows() {
        let order_id = row.unsigned("order_id")?;
        if !seen.insert(order_id) {
            return Err(PipelineError::malformed(
                raw.table.name(),
                format!("line {}: duplicate order_id {}", row.line, order_id),
            ));
        }
        let ordered_at = row.timestamp()?.ok_or_else(|| {
            PipelineError::malformed(raw.table.name(), "orders table has no temporal columns")
        })?;
        orders.push(Order {
            order_id,
            date: ordered_at.date(),
            time: ordered_at.time(),
            ordered_at,
        });
    }

    Ok(orders)
}

fn decode_order_details(raw: &RawTable) -> Result<Vec<OrderDetail>, PipelineError> {
    let mut details = Vec::with_capacity(raw.rows.len());

    for row in raw.rows() {
        row.timestamp()?;
        let order_details_id = match row.optional_field("order_details_id") {
            Some(v) if !v.is_empty() => Some(row.unsigned("order_details_id")?),
            _ => None,
        };
        details.push(OrderDetail {
            order_details_id,
            order_id: row.unsigned("order_id")?,
            pizza_id: row.non_empty("pizza_id")?,
            quantity: row.unsigned("quantity")?,
        });
    }

    Ok(details)
}

fn decode_pizza_types(raw: &RawTable) -> Result<Vec<PizzaType>, PipelineError> {
    let mut types = Vec::with_capacity(raw.rows.len());

    for row in raw.rows() {
        row.timestamp()?;
        types.push(PizzaType {
            pizza_type_id: row.non_empty("pizza_type_id")?,
            name: row.optional_field("name").unwrap_or_default().to_string(),
            category: row.optional_field("category").unwrap_or_default().to_string(),
            ingredients: row.optional_field("ingredients").unwrap_or_default().to_string(),
        });
    }

    Ok(types)
}

fn decode_pizzas(raw: &RawTable) -> Result<Vec<Pizza>, PipelineError> {
    let mut pizzas = Vec::with_capacity(raw.rows.len());

    for row in raw.rows() {
        row.timestamp()?;
        pizzas.push(Pizza {
            pizza_id: row.non_empty("pizza_id")?,
            pizza_type_id: row.optional_field("pizza_type_id").unwrap_or_default().to_string(),
            size: row.optional_field("size").unwrap_or_default().to_string(),
            price: row.price("price")?,
        });
    }

    Ok(pizzas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::InMemorySource;
    use chrono::Timelike;

    const ORDERS: &str = "order_id,date,time\n1,2015-01-01,11:38:36\n2,2015-01-01,13:57:40\n";
    const DETAILS: &str = "order_details_id,order_id,pizza_id,quantity\n1,1,hawaiian_m,1\n2,1,classic_dlx_m,1\n3,2,hawaiian_m,2\n";
    const TYPES: &str = "pizza_type_id,name,category,ingredients\nhawaiian,The Hawaiian Pizza,Classic,\"Sliced Ham, Pineapple, Mozzarella Cheese\"\n";
    const PIZZAS: &str = "pizza_id,pizza_type_id,size,price\nhawaiian_m,hawaiian,M,13.25\nclassic_dlx_m,classic_dlx,M,16\n";

    fn full_source() -> InMemorySource {
        InMemorySource::new()
            .with(TableId::Orders, ORDERS)
            .with(TableId::OrderDetails, DETAILS)
            .with(TableId::PizzaTypes, TYPES)
            .with(TableId::Pizzas, PIZZAS)
    }

    fn decode_orders_csv(text: &str) -> Result<Vec<Order>, PipelineError> {
        decode_orders(&RawTable::parse(TableId::Orders, text)?)
    }

    fn decode_order_details_csv(text: &str) -> Result<Vec<OrderDetail>, PipelineError> {
        decode_order_details(&RawTable::parse(TableId::OrderDetails, text)?)
    }

    fn decode_pizzas_csv(text: &str) -> Result<Vec<Pizza>, PipelineError> {
        decode_pizzas(&RawTable::parse(TableId::Pizzas, text)?)
    }

    fn reason_of(err: PipelineError) -> String {
        match err {
            PipelineError::MalformedTable { reason, .. } => reason,
            other => panic!("expected MalformedTable, got {:?}", other),
        }
    }

    #[test]
    fn test_load_tables_basic() {
        let tables = load_tables(&full_source()).unwrap();

        assert_eq!(tables.orders.len(), 2);
        assert_eq!(tables.order_details.len(), 3);
        assert_eq!(tables.pizza_types.len(), 1);
        assert_eq!(tables.pizzas.len(), 2);

        let first = &tables.orders[0];
        assert_eq!(first.order_id, 1);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(first.ordered_at.hour(), 11);
        assert_eq!(first.ordered_at.minute(), 38);

        assert_eq!(tables.order_details[2].quantity, 2);
        assert_eq!(tables.order_details[0].order_details_id, Some(1));
        assert_eq!(tables.pizzas[0].price, Cents(1325));
        assert_eq!(tables.pizzas[1].price, Cents(1600));
        assert_eq!(
            tables.pizza_types[0].ingredients,
            "Sliced Ham, Pineapple, Mozzarella Cheese"
        );
    }

    #[test]
    fn test_missing_table_fails() {
        let source = InMemorySource::new().with(TableId::Orders, ORDERS);
        assert!(matches!(
            load_tables(&source),
            Err(PipelineError::MalformedTable { .. })
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let err = decode_pizzas_csv("pizza_id,size\nhawaiian_m,M\n").unwrap_err();
        assert!(reason_of(err).contains("missing required column 'price'"));
    }

    #[test]
    fn test_bad_date_is_reported_with_line() {
        let err = decode_orders_csv("order_id,date,time\n1,2015-01-01,11:00:00\n2,01/02/2015,12:00:00\n")
            .unwrap_err();
        let reason = reason_of(err);
        assert!(reason.contains("line 3"), "{}", reason);
        assert!(reason.contains("01/02/2015"), "{}", reason);
    }

    #[test]
    fn test_bad_time_is_rejected() {
        let err = decode_orders_csv("order_id,date,time\n1,2015-01-01,11h00\n").unwrap_err();
        assert!(reason_of(err).contains("11h00"));
    }

    #[test]
    fn test_hour_24_is_rejected() {
        assert!(decode_orders_csv("order_id,date,time\n1,2015-01-01,24:00:00\n").is_err());
    }

    #[test]
    fn test_temporal_table_without_time_column() {
        let err = decode_order_details_csv(
            "order_id,pizza_id,quantity,delivery_date\n1,hawaiian_m,1,2015-01-01\n",
        )
        .unwrap_err();
        assert!(reason_of(err).contains("no 'date' column"));
    }

    #[test]
    fn test_every_temporal_column_is_parsed() {
        let csv = "order_id,date,time,delivery_time\n1,2015-01-01,11:00:00,not-a-time\n";
        let err = decode_orders_csv(csv).unwrap_err();
        assert!(reason_of(err).contains("delivery_time"));
    }

    #[test]
    fn test_duplicate_order_id() {
        let err = decode_orders_csv("order_id,date,time\n1,2015-01-01,11:00:00\n1,2015-01-02,11:00:00\n")
            .unwrap_err();
        assert!(reason_of(err).contains("duplicate order_id 1"));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let err = decode_order_details_csv("order_id,pizza_id,quantity\n1,hawaiian_m,-2\n").unwrap_err();
        assert!(reason_of(err).contains("quantity"));
    }

    #[test]
    fn test_bad_price_rejected() {
        assert!(decode_pizzas_csv("pizza_id,price\nhawaiian_m,abc\n").is_err());
        assert!(decode_pizzas_csv("pizza_id,price\nhawaiian_m,-3.5\n").is_err());
        assert!(decode_pizzas_csv("pizza_id,price\nhawaiian_m,\n").is_err());
    }

    #[test]
    fn test_details_without_line_id() {
        let details = decode_order_details_csv("order_id,pizza_id,quantity\n7,A,2\n").unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].order_details_id, None);
        assert_eq!(details[0].order_id, 7);
        assert_eq!(details[0].pizza_id, "A");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let orders = decode_orders_csv("order_id, date, time\n 1 , 2015-02-03 , 09:05:00 \n").unwrap();
        assert_eq!(orders[0].date, NaiveDate::from_ymd_opt(2015, 2, 3).unwrap());
        assert_eq!(orders[0].ordered_at.hour(), 9);
    }

    #[test]
    fn test_empty_tables_load() {
        let source = InMemorySource::new()
            .with(TableId::Orders, "order_id,date,time\n")
            .with(TableId::OrderDetails, "order_id,pizza_id,quantity\n")
            .with(TableId::PizzaTypes, "pizza_type_id\n")
            .with(TableId::Pizzas, "pizza_id,price\n");
        let tables = load_tables(&source).unwrap();
        assert!(tables.orders.is_empty());
        assert!(tables.pizzas.is_empty());
    }
}
