//! Error handling for crash analytics.
//!
//! Typed failures live in [`Error`]; library functions return
//! [`anyhow::Result`] so that I/O and Arrow failures can carry context
//! about the table or file being processed.

use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Specialized error type for crash analytics
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration file could not be parsed
    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A column a query relies on is missing from a table
    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A column could not be viewed as the type a query needs
    #[error("Column '{column}' cannot be read as {expected}")]
    Type { column: String, expected: String },

    /// A filter expression could not be evaluated
    #[error("Filter error: {0}")]
    Filter(String),

    /// A table has more rows than a `u32` take index can address
    #[error("Table with {rows} rows exceeds the u32 row index range")]
    TooManyRows { rows: usize },

    /// Standard input closed before the expected config name was given
    #[error("Prompt closed before receiving '{expected}'")]
    Prompt { expected: String },
}

/// Result type for crash analytics operations
pub type Result<T> = anyhow::Result<T>;
