pub mod loader;
pub mod schema;
pub mod source;

pub use loader::load_tables;
pub use schema::TableId;
pub use source::{CsvDirectory, InMemorySource, TableSource};
