//! Arrow data handling utilities
//!
//! Helpers for extracting typed columns from record batches.

pub mod array_utils;

pub use array_utils::{downcast_array, get_column, int64_column, string_column};
