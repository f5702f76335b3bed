//! Result values produced by the analyses

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::Result;

/// The outcome of one analysis, ready to be written as a small table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A single count
    Count { label: &'static str, value: usize },
    /// A single category value; `None` when no row qualified
    Label {
        label: &'static str,
        value: Option<String>,
    },
    /// An ordered list of category values
    Column {
        name: &'static str,
        values: Vec<String>,
    },
    /// Ordered pairs of category values
    Pairs {
        columns: [&'static str; 2],
        rows: Vec<(String, String)>,
    },
}

fn utf8_field(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

impl Answer {
    /// Number of data rows the answer serializes to
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Count { .. } => 1,
            Self::Label { value, .. } => usize::from(value.is_some()),
            Self::Column { values, .. } => values.len(),
            Self::Pairs { rows, .. } => rows.len(),
        }
    }

    /// Whether the answer has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lay the answer out as a record batch with one header per column
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let (fields, columns): (Vec<Field>, Vec<ArrayRef>) = match self {
            Self::Count { label, value } => (
                vec![Field::new(*label, DataType::UInt64, false)],
                vec![Arc::new(UInt64Array::from(vec![*value as u64]))],
            ),
            Self::Label { label, value } => (
                vec![utf8_field(label)],
                vec![Arc::new(StringArray::from_iter(value.iter().map(Some)))],
            ),
            Self::Column { name, values } => (
                vec![utf8_field(name)],
                vec![Arc::new(StringArray::from_iter_values(values))],
            ),
            Self::Pairs { columns, rows } => (
                vec![utf8_field(columns[0]), utf8_field(columns[1])],
                vec![
                    Arc::new(StringArray::from_iter_values(rows.iter().map(|(a, _)| a))),
                    Arc::new(StringArray::from_iter_values(rows.iter().map(|(_, b)| b))),
                ],
            ),
        };

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .context("Failed to lay out answer as a record batch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn test_count_layout() {
        let answer = Answer::Count {
            label: "male_fatalities",
            value: 3,
        };
        let batch = answer.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.schema().field(0).name(), "male_fatalities");
    }

    #[test]
    fn test_missing_label_has_no_rows() {
        let answer = Answer::Label {
            label: "state",
            value: None,
        };
        assert!(answer.is_empty());
        assert_eq!(answer.to_record_batch().unwrap().num_rows(), 0);
    }

    #[test]
    fn test_pairs_layout() {
        let answer = Answer::Pairs {
            columns: ["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID"],
            rows: vec![("SUV".into(), "WHITE".into()), ("VAN".into(), "HISPANIC".into())],
        };
        let batch = answer.to_record_batch().unwrap();
        assert_eq!(batch.num_columns(), 2);
        let eth = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(eth.value(1), "HISPANIC");
        assert_eq!(eth.len(), 2);
    }
}
