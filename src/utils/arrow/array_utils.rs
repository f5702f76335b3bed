//! Utilities for working with Arrow arrays.
//!
//! This module provides helpers for safely extracting columns from record
//! batches in the type a query needs, casting when the CSV schema inference
//! picked a different one.

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::compute::kernels::cast::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};

/// Get a column from a record batch, cast to `expected_type` when needed
///
/// Values that cannot be represented in the target type become null, so a
/// non-numeric count such as `"UNKNOWN"` simply stops matching numeric filters.
///
/// # Errors
///
/// Returns [`Error::ColumnNotFound`] if the batch has no column with that name.
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
) -> Result<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| Error::ColumnNotFound {
            column: column_name.to_string(),
        })?;

    let column = batch.column(idx);
    let actual_type = column.data_type();

    if actual_type == expected_type {
        return Ok(column.clone());
    }

    debug!("Casting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    cast(column, expected_type).map_err(|e| {
        Error::Type {
            column: column_name.to_string(),
            expected: format!("{expected_type:?} ({e})"),
        }
        .into()
    })
}

/// Downcast a column to a specific array type with clear error messages
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::Type {
            column: column_name.to_string(),
            expected: expected_type_name.to_string(),
        }
        .into()
    })
}

/// Read a column as text
///
/// Every categorical comparison in the queries happens on the text form of a
/// column, so integer-inferred codes and string codes compare the same way.
pub fn string_column(batch: &RecordBatch, column_name: &str) -> Result<StringArray> {
    let array = get_column(batch, column_name, &DataType::Utf8)?;
    Ok(downcast_array::<StringArray>(&array, column_name, "Utf8")?.clone())
}

/// Read a column as 64-bit integers
pub fn int64_column(batch: &RecordBatch, column_name: &str) -> Result<Int64Array> {
    let array = get_column(batch, column_name, &DataType::Int64)?;
    Ok(downcast_array::<Int64Array>(&array, column_name, "Int64")?.clone())
}
