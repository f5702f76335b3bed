//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use crash_analytics::RecordBatch;

/// Build a table of text columns; an empty string stands for a missing value
pub fn table(columns: &[(&str, Vec<String>)]) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|(_, values)| {
            Arc::new(StringArray::from_iter(
                values.iter().map(|v| (!v.is_empty()).then_some(v.as_str())),
            )) as ArrayRef
        })
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Owned column values from string literals
pub fn col(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

/// Text values of a column, missing values as `None`
pub fn column_values(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
    crash_analytics::utils::arrow::string_column(batch, name)
        .unwrap()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
