//! Configuration file handling.
//!
//! Settings come from an optional `.pizzaboard.toml`; command-line flags
//! override them. The dashboard token is never read from the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::ReferenceYear;
use crate::data::{CsvDirectory, TableId};
use crate::views::Header;

pub const DEFAULT_CONFIG_FILE: &str = ".pizzaboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub aggregate: AggregateConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

/// Where the four CSV tables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_orders")]
    pub orders: String,

    #[serde(default = "default_order_details")]
    pub order_details: String,

    #[serde(default = "default_pizza_types")]
    pub pizza_types: String,

    #[serde(default = "default_pizzas")]
    pub pizzas: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            orders: default_orders(),
            order_details: default_order_details(),
            pizza_types: default_pizza_types(),
            pizzas: default_pizzas(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_orders() -> String {
    TableId::Orders.default_file().to_string()
}

fn default_order_details() -> String {
    TableId::OrderDetails.default_file().to_string()
}

fn default_pizza_types() -> String {
    TableId::PizzaTypes.default_file().to_string()
}

fn default_pizzas() -> String {
    TableId::Pizzas.default_file().to_string()
}

impl DataConfig {
    pub fn source(&self) -> CsvDirectory {
        CsvDirectory::new(&self.dir)
            .with_file(TableId::Orders, &self.orders)
            .with_file(TableId::OrderDetails, &self.order_details)
            .with_file(TableId::PizzaTypes, &self.pizza_types)
            .with_file(TableId::Pizzas, &self.pizzas)
    }
}

/// Board naming and page header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,

    #[serde(default = "default_menu_path")]
    pub menu_path: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            menu_path: default_menu_path(),
            title: None,
            subtitle: None,
        }
    }
}

fn default_board_name() -> String {
    "Sales Pizza Feedback".to_string()
}

fn default_menu_path() -> String {
    "Overview".to_string()
}

impl BoardConfig {
    pub fn header(&self) -> Header {
        let defaults = Header::default();
        Header {
            title: self.title.clone().unwrap_or(defaults.title),
            subtitle: self.subtitle.clone().unwrap_or(defaults.subtitle),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Year used for per-day averages. Derived from the orders when unset.
    #[serde(default)]
    pub reference_year: Option<i32>,
}

impl AggregateConfig {
    pub fn reference_year(&self) -> Result<Option<ReferenceYear>> {
        match self.reference_year {
            Some(y) => ReferenceYear::new(y)
                .map(Some)
                .ok_or_else(|| anyhow!("reference year {} is out of range", y)),
            None => Ok(None),
        }
    }
}

/// Dashboard endpoint for `publish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub workspace_id: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: None,
            workspace_id: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl SinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub reference_year: Option<i32>,
    pub url: Option<String>,
    pub workspace_id: Option<String>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `.pizzaboard.toml` from `dir` when present.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Explicit file, else the default file in the working directory, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_dir(Path::new("."))?.unwrap_or_default()),
        }
    }

    /// Apply command-line overrides. Only values actually given replace file settings.
    pub fn merge(&mut self, overrides: &Overrides) {
        if let Some(ref dir) = overrides.data_dir {
            self.data.dir = dir.clone();
        }
        if let Some(year) = overrides.reference_year {
            self.aggregate.reference_year = Some(year);
        }
        if let Some(ref url) = overrides.url {
            self.sink.url = Some(url.clone());
        }
        if let Some(ref ws) = overrides.workspace_id {
            self.sink.workspace_id = Some(ws.clone());
        }
    }
}
