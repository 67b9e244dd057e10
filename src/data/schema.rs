//! Identifiers, default file names and column layout of the input tables.

/// One of the four fixed input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    OrderDetails,
    Orders,
    PizzaTypes,
    Pizzas,
}

impl TableId {
    /// All tables, in load order.
    pub const ALL: [TableId; 4] = [
        TableId::OrderDetails,
        TableId::Orders,
        TableId::PizzaTypes,
        TableId::Pizzas,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableId::OrderDetails => "order_details",
            TableId::Orders => "orders",
            TableId::PizzaTypes => "pizza_types",
            TableId::Pizzas => "pizzas",
        }
    }

    pub fn default_file(&self) -> &'static str {
        match self {
            TableId::OrderDetails => "order_details.csv",
            TableId::Orders => "orders.csv",
            TableId::PizzaTypes => "pizza_types.csv",
            TableId::Pizzas => "pizzas.csv",
        }
    }

    /// Columns that must be present in the header row.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableId::OrderDetails => ORDER_DETAILS_COLUMNS,
            TableId::Orders => ORDERS_COLUMNS,
            TableId::PizzaTypes => PIZZA_TYPES_COLUMNS,
            TableId::Pizzas => PIZZAS_COLUMNS,
        }
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub const ORDERS_COLUMNS: &[&str] = &["order_id", "date", "time"];

// order_details_id is optional: synthetic fixtures often leave it out.
pub const ORDER_DETAILS_COLUMNS: &[&str] = &["order_id", "pizza_id", "quantity"];

pub const PIZZA_TYPES_COLUMNS: &[&str] = &["pizza_type_id"];

pub const PIZZAS_COLUMNS: &[&str] = &["pizza_id", "price"];

/// Fixed formats of the temporal columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A column is temporal when its name mentions a date or a time.
pub fn is_temporal_column(name: &str) -> bool {
    name.contains("date") || name.contains("time")
}
