pub mod aggregate;
pub mod board;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod types;
pub mod views;

pub use error::{PipelineError, ViewKind};
