use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PipelineError;

use super::schema::TableId;

/// Abstraction over where table contents come from.
pub trait TableSource {
    /// Raw CSV text of one table.
    fn read(&self, table: TableId) -> Result<String, PipelineError>;
}

/// Tables stored as CSV files in one directory.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
    files: HashMap<TableId, String>,
}

impl CsvDirectory {
    /// Use the default file name for every table.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let files = TableId::ALL
            .iter()
            .map(|t| (*t, t.default_file().to_string()))
            .collect();
        Self {
            dir: dir.into(),
            files,
        }
    }

    /// Override the file name of one table.
    pub fn with_file(mut self, table: TableId, file: impl Into<String>) -> Self {
        self.files.insert(table, file.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, table: TableId) -> PathBuf {
        let file = self
            .files
            .get(&table)
            .map(String::as_str)
            .unwrap_or_else(|| table.default_file());
        self.dir.join(file)
    }
}

impl TableSource for CsvDirectory {
    fn read(&self, table: TableId) -> Result<String, PipelineError> {
        let path = self.path_of(table);
        let bytes = std::fs::read(&path).map_err(|e| {
            PipelineError::malformed(
                table.name(),
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        debug!(table = table.name(), path = %path.display(), bytes = bytes.len(), "read table file");

        // pizza_types.csv ships in Windows-1252 and holds no join keys.
        if table == TableId::PizzaTypes {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        String::from_utf8(bytes).map_err(|e| {
            PipelineError::malformed(
                table.name(),
                format!("{} is not valid UTF-8: {}", path.display(), e.utf8_error()),
            )
        })
    }
}

/// Tables held in memory (fixtures, tests).
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<TableId, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, table: TableId, csv: impl Into<String>) -> Self {
        self.tables.insert(table, csv.into());
        self
    }
}

impl TableSource for InMemorySource {
    fn read(&self, table: TableId) -> Result<String, PipelineError> {
        self.tables
            .get(&table)
            .cloned()
            .ok_or_else(|| PipelineError::malformed(table.name(), "table not provided"))
    }
}
