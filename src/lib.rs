//! Descriptive statistics over traffic-accident CSV tables.
//!
//! The six input tables are read into Arrow record batches once, then eight
//! independent analyses (filter, join, group, rank, top-N) each produce a
//! small answer that is written to its own CSV file.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod schema;
pub mod utils;
pub mod writer;

// Re-export the most common types for easier use
pub use config::{AnalyticsConfig, CONFIG_FILE_NAME, CsvLoaderConfig, DataPaths, OutputPaths};
pub use error::{Error, Result};
pub use loader::{CrashTables, read_csv};
pub use pipeline::{RunSummary, run_all, run_analyses};
pub use writer::write_answer;

// Query engine
pub use algorithm::{Analysis, Answer, drop_duplicates, inner_join};
pub use filter::{Expr, LiteralValue, filter_by};

// Arrow types
pub use arrow::record_batch::RecordBatch;
