//! Row-level table operations: inner join and duplicate removal
//!
//! Both operations gather output rows with Arrow's `take` kernel, so every
//! column keeps the type the loader inferred for it.

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::utils::arrow::string_column;

/// Suffix for overlapping columns coming from the left table
pub const LEFT_SUFFIX: &str = "_x";
/// Suffix for overlapping columns coming from the right table
pub const RIGHT_SUFFIX: &str = "_y";

fn row_index(i: usize) -> Result<u32> {
    u32::try_from(i).map_err(|_| Error::TooManyRows { rows: i + 1 }.into())
}

/// Gather the given rows of every column
fn take_columns(columns: &[ArrayRef], indices: &UInt32Array) -> Result<Vec<ArrayRef>> {
    columns
        .iter()
        .map(|col| take(col.as_ref(), indices, None))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to gather joined rows")
}

/// Inner join two tables on a shared key column
///
/// Keys are compared on their text form and null keys never match. The
/// output is grouped by key in order of first appearance in `left`; inside
/// a group every left row, in order, is paired with every right row, in
/// order. The key appears once, at its position in `left`. Other columns
/// present on both sides are renamed with [`LEFT_SUFFIX`] and
/// [`RIGHT_SUFFIX`].
pub fn inner_join(left: &RecordBatch, right: &RecordBatch, key: &str) -> Result<RecordBatch> {
    let left_keys = string_column(left, key).context("Reading left join key")?;
    let right_keys = string_column(right, key).context("Reading right join key")?;

    let mut right_rows: FxHashMap<&str, Vec<u32>> = FxHashMap::default();
    for (i, value) in right_keys.iter().enumerate() {
        if let Some(value) = value {
            right_rows.entry(value).or_default().push(row_index(i)?);
        }
    }

    // Left rows grouped by key, groups in order of first appearance
    let mut group_of: FxHashMap<&str, usize> = FxHashMap::default();
    let mut left_groups: Vec<(&str, Vec<u32>)> = Vec::new();
    for (i, value) in left_keys.iter().enumerate() {
        let Some(value) = value else { continue };
        let group = *group_of.entry(value).or_insert_with(|| {
            left_groups.push((value, Vec::new()));
            left_groups.len() - 1
        });
        left_groups[group].1.push(row_index(i)?);
    }

    let mut left_take = Vec::new();
    let mut right_take = Vec::new();
    for (value, left_idx) in &left_groups {
        let Some(right_idx) = right_rows.get(value) else {
            continue;
        };
        for &l in left_idx {
            for &r in right_idx {
                left_take.push(l);
                right_take.push(r);
            }
        }
    }

    let left_schema = left.schema();
    let right_schema = right.schema();
    let right_key_idx = right_schema.index_of(key)?;

    let mut fields: Vec<FieldRef> = Vec::with_capacity(left.num_columns() + right.num_columns());
    for field in left_schema.fields() {
        let name = field.name();
        if name != key && right_schema.field_with_name(name).is_ok() {
            fields.push(Arc::new(
                field.as_ref().clone().with_name(format!("{name}{LEFT_SUFFIX}")),
            ));
        } else {
            fields.push(field.clone());
        }
    }

    let mut right_columns = Vec::with_capacity(right.num_columns());
    for (idx, field) in right_schema.fields().iter().enumerate() {
        if idx == right_key_idx {
            continue;
        }
        let name = field.name();
        if left_schema.field_with_name(name).is_ok() {
            fields.push(Arc::new(
                field.as_ref().clone().with_name(format!("{name}{RIGHT_SUFFIX}")),
            ));
        } else {
            fields.push(field.clone());
        }
        right_columns.push(right.column(idx).clone());
    }

    let left_indices = UInt32Array::from(left_take);
    let right_indices = UInt32Array::from(right_take);

    let mut columns = take_columns(left.columns(), &left_indices)?;
    columns.extend(take_columns(&right_columns, &right_indices)?);

    let schema = Arc::new(Schema::new(fields));
    let joined = RecordBatch::try_new(schema, columns)
        .with_context(|| format!("Failed to assemble join on '{key}'"))?;

    log::debug!(
        "Joined {} x {} rows on {key} into {} rows",
        left.num_rows(),
        right.num_rows(),
        joined.num_rows()
    );
    Ok(joined)
}

/// Remove rows identical across every column, keeping the first occurrence
///
/// Null cells compare equal to each other.
pub fn drop_duplicates(batch: &RecordBatch) -> Result<RecordBatch> {
    if batch.num_columns() == 0 {
        return Ok(batch.clone());
    }

    let sort_fields = batch
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(sort_fields).context("Failed to build row converter")?;
    let rows = converter
        .convert_columns(batch.columns())
        .context("Failed to encode rows for deduplication")?;

    let mut seen = FxHashSet::default();
    let mut keep = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if seen.insert(row) {
            keep.push(row_index(i)?);
        }
    }

    if keep.len() == batch.num_rows() {
        return Ok(batch.clone());
    }

    let indices = UInt32Array::from(keep);
    let columns = take_columns(batch.columns(), &indices)?;
    RecordBatch::try_new(batch.schema(), columns).context("Failed to assemble deduplicated rows")
}

/// Number of distinct non-null values in a column
pub fn distinct_count(batch: &RecordBatch, column: &str) -> Result<usize> {
    let values = string_column(batch, column)?;
    Ok(values.iter().flatten().collect::<FxHashSet<_>>().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field};

    fn units() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("CRASH_ID", DataType::Int64, true),
            Field::new("VEH_MAKE_ID", DataType::Utf8, true),
            Field::new("DEATH_CNT", DataType::Int64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(2), Some(1), Some(2), None])),
                Arc::new(StringArray::from(vec!["FORD", "TOYOTA", "HONDA", "KIA"])),
                Arc::new(Int64Array::from(vec![0, 1, 0, 0])),
            ],
        )
        .unwrap()
    }

    fn persons() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("CRASH_ID", DataType::Utf8, true),
            Field::new("PRSN_GNDR_ID", DataType::Utf8, true),
            Field::new("DEATH_CNT", DataType::Int64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("1"), Some("2"), Some("2"), None])),
                Arc::new(StringArray::from(vec!["MALE", "FEMALE", "MALE", "MALE"])),
                Arc::new(Int64Array::from(vec![1, 0, 0, 0])),
            ],
        )
        .unwrap()
    }

    fn strings(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
        string_column(batch, name)
            .unwrap()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_inner_join_order_and_suffixes() {
        let joined = inner_join(&units(), &persons(), "CRASH_ID").unwrap();

        let names: Vec<String> = joined
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            vec!["CRASH_ID", "VEH_MAKE_ID", "DEATH_CNT_x", "PRSN_GNDR_ID", "DEATH_CNT_y"]
        );

        // Key 2 appears first in units: FORD and HONDA each pair with both persons
        assert_eq!(joined.num_rows(), 5);
        assert_eq!(
            strings(&joined, "VEH_MAKE_ID"),
            ["FORD", "FORD", "HONDA", "HONDA", "TOYOTA"]
                .map(|s| Some(s.to_string()))
                .to_vec()
        );
        assert_eq!(
            strings(&joined, "PRSN_GNDR_ID"),
            ["FEMALE", "MALE", "FEMALE", "MALE", "MALE"]
                .map(|s| Some(s.to_string()))
                .to_vec()
        );
        assert_eq!(joined.column(0).data_type(), &DataType::Int64);
    }

    #[test]
    fn test_inner_join_without_matches_is_empty() {
        let joined = inner_join(&units().slice(1, 1), &persons().slice(1, 2), "CRASH_ID").unwrap();
        assert_eq!(joined.num_rows(), 0);
        assert_eq!(joined.num_columns(), 5);
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let schema = Schema::new(vec![
            Field::new("A", DataType::Utf8, true),
            Field::new("B", DataType::Int64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("x"), Some("x"), None, None, Some("x")])),
                Arc::new(Int64Array::from(vec![Some(1), Some(1), None, None, Some(2)])),
            ],
        )
        .unwrap();

        let deduped = drop_duplicates(&batch).unwrap();
        assert_eq!(deduped.num_rows(), 3);
        let b = deduped.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(b.value(0), 1);
        assert!(b.is_null(1));
        assert_eq!(b.value(2), 2);
    }

    #[test]
    fn test_distinct_count_ignores_nulls() {
        assert_eq!(distinct_count(&units(), "CRASH_ID").unwrap(), 2);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_row_index_limit() {
        assert_eq!(row_index(7).unwrap(), 7);
        let err = row_index(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::TooManyRows { .. })));
    }
}
