//! Expression-based filtering for crash tables
//!
//! This module provides an expression-based filtering system that
//! allows filtering Arrow record batches based on column values.
//!
//! Predicates follow three-valued logic: a comparison against a null cell
//! yields null, `And`/`Or` use Kleene semantics and a null in the final mask
//! drops the row. A missing value therefore never matches a filter, negated
//! or not.

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, BooleanArray, Int64Array, Scalar, StringArray};
use arrow::compute::kernels::cmp::{eq, gt};
use arrow::compute::{and_kleene, is_not_null, not, or_kleene};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::filter::core::{BatchFilter, filter_record_batch};
use crate::utils::arrow::{get_column, string_column};

/// Represents a filter expression over the columns of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, LiteralValue),

    /// Column is greater than a literal value
    Gt(String, LiteralValue),

    /// Column is in a set of values
    In(String, Vec<LiteralValue>),

    /// Column is not in a set of values
    NotIn(String, Vec<LiteralValue>),

    /// Column is not null
    IsNotNull(String),

    /// Column value contains a substring (case-sensitive)
    Contains(String, String),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical OR of expressions
    Or(Vec<Expr>),

    /// Logical NOT of an expression
    Not(Box<Expr>),
}

/// Represents a literal value that can be used in filter expressions
///
/// String literals compare against the text form of a column, so a code
/// column inferred as integers still matches `"1"`. Integer literals cast
/// the column to `Int64`; unparseable cells become null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// Integer value
    Int(i64),

    /// String value
    String(String),
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl LiteralValue {
    fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int64,
            Self::String(_) => DataType::Utf8,
        }
    }

    fn to_scalar(&self) -> Scalar<ArrayRef> {
        let array: ArrayRef = match self {
            Self::Int(n) => Arc::new(Int64Array::from(vec![*n])),
            Self::String(s) => Arc::new(StringArray::from(vec![s.as_str()])),
        };
        Scalar::new(array)
    }
}

impl Expr {
    /// `column == value`
    pub fn eq(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    /// `column > value`
    pub fn gt(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Gt(column.to_string(), value.into())
    }

    /// `column` is one of `values`
    pub fn is_in<V: Into<LiteralValue>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// `column` is none of `values`
    pub fn not_in<V: Into<LiteralValue>>(
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::NotIn(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// `column` contains `needle`
    pub fn contains(column: &str, needle: &str) -> Self {
        Self::Contains(column.to_string(), needle.to_string())
    }

    /// `column` is present
    pub fn not_null(column: &str) -> Self {
        Self::IsNotNull(column.to_string())
    }
}

/// Comparison kernels supported by [`compare`]
#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Gt,
}

/// Evaluate an expression against a record batch
///
/// # Returns
/// A boolean array, possibly containing nulls, with one entry per row
///
/// # Errors
/// Returns an error if a referenced column is missing or a kernel fails
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::And(exprs) => {
            let mut result = BooleanArray::from(vec![true; batch.num_rows()]);
            for expr in exprs {
                let mask = evaluate_expr(batch, expr)?;
                result = and_kleene(&result, &mask)
                    .context("Failed to apply AND operation to filter arrays")?;
            }
            Ok(result)
        }

        Expr::Or(exprs) => {
            let mut result = BooleanArray::from(vec![false; batch.num_rows()]);
            for expr in exprs {
                let mask = evaluate_expr(batch, expr)?;
                result = or_kleene(&result, &mask)
                    .context("Failed to apply OR operation to filter arrays")?;
            }
            Ok(result)
        }

        Expr::Not(expr) => {
            let mask = evaluate_expr(batch, expr)?;
            Ok(not(&mask).context("Failed to apply NOT operation to filter array")?)
        }

        Expr::Eq(col, value) => compare(batch, col, value, CmpOp::Eq),
        Expr::Gt(col, value) => compare(batch, col, value, CmpOp::Gt),

        Expr::In(col, values) => evaluate_in(batch, col, values),
        Expr::NotIn(col, values) => {
            let in_mask = evaluate_in(batch, col, values)?;
            Ok(not(&in_mask).context("Failed to negate IN filter")?)
        }

        Expr::IsNotNull(col) => {
            let column = column_by_name(batch, col)?;
            Ok(is_not_null(column.as_ref()).context("Failed to compute null mask")?)
        }

        Expr::Contains(col, needle) => {
            string_predicate(batch, col, |s| s.contains(needle.as_str()))
        }
    }
}

/// Look up a column as stored, without casting
fn column_by_name<'a>(batch: &'a RecordBatch, col: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(col).ok_or_else(|| {
        Error::ColumnNotFound {
            column: col.to_string(),
        }
        .into()
    })
}

/// Compare a column against a literal using Arrow's vectorized kernels
///
/// String comparisons are lexical, so `"DAMAGED 10" > "DAMAGED 4"` is false.
fn compare(
    batch: &RecordBatch,
    col: &str,
    value: &LiteralValue,
    op: CmpOp,
) -> Result<BooleanArray> {
    let column = get_column(batch, col, &value.data_type())?;
    let scalar = value.to_scalar();

    let result = match op {
        CmpOp::Eq => eq(&column, &scalar),
        CmpOp::Gt => gt(&column, &scalar),
    };

    result.with_context(|| format!("Failed to compare column '{col}' with {value:?} ({op:?})"))
}

/// Evaluate membership as a Kleene OR of equality tests
fn evaluate_in(batch: &RecordBatch, col: &str, values: &[LiteralValue]) -> Result<BooleanArray> {
    // Resolve the column even for an empty set so a typo still fails loudly
    column_by_name(batch, col)?;

    let mut result = BooleanArray::from(vec![false; batch.num_rows()]);
    for value in values {
        let mask = compare(batch, col, value, CmpOp::Eq)?;
        result = or_kleene(&result, &mask).context("Failed to combine IN filter masks")?;
    }
    Ok(result)
}

/// Apply a predicate to the text form of a column, keeping nulls as nulls
fn string_predicate(
    batch: &RecordBatch,
    col: &str,
    predicate: impl Fn(&str) -> bool,
) -> Result<BooleanArray> {
    let strings = string_column(batch, col)?;
    Ok(strings.iter().map(|v| v.map(&predicate)).collect())
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    /// The expression to evaluate
    expr: Expr,
}

impl ExpressionFilter {
    /// Create a new expression filter
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

impl BatchFilter for ExpressionFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = evaluate_expr(batch, &self.expr)
            .with_context(|| format!("Error evaluating expression: {:?}", self.expr))?;
        filter_record_batch(batch, &mask)
    }
}

/// Keep the rows of `batch` matching `expr`
pub fn filter_by(batch: &RecordBatch, expr: Expr) -> Result<RecordBatch> {
    let filtered = ExpressionFilter::new(expr).filter(batch)?;
    log::debug!(
        "Filter kept {} of {} rows",
        filtered.num_rows(),
        batch.num_rows()
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use arrow::datatypes::{Field, Schema};

    /// Mask values with null read as false
    fn mask_to_bools(mask: &BooleanArray) -> Vec<bool> {
        (0..mask.len())
            .map(|i| mask.is_valid(i) && mask.value(i))
            .collect()
    }

    fn units() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("CRASH_ID", DataType::Int64, false),
            Field::new("VEH_DMAG_SCL_1_ID", DataType::Utf8, true),
            Field::new("DEATH_CNT", DataType::Int64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5])),
                Arc::new(StringArray::from(vec![
                    Some("DAMAGED 5"),
                    Some("DAMAGED 10"),
                    None,
                    Some("NO DAMAGE"),
                    Some("DAMAGED 7 HIGHEST"),
                ])),
                Arc::new(Int64Array::from(vec![Some(1), Some(0), Some(1), None, Some(2)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_string_gt_is_lexical() {
        let mask = evaluate_expr(&units(), &Expr::gt("VEH_DMAG_SCL_1_ID", "DAMAGED 4")).unwrap();
        // "DAMAGED 10" sorts before "DAMAGED 4"; "NO DAMAGE" sorts after it
        assert_eq!(mask_to_bools(&mask), vec![true, false, false, true, true]);
    }

    #[test]
    fn test_int_eq_and_nulls() {
        let mask = evaluate_expr(&units(), &Expr::eq("DEATH_CNT", 1_i64)).unwrap();
        assert_eq!(mask_to_bools(&mask), vec![true, false, true, false, false]);
        assert!(mask.is_null(3));
    }

    #[test]
    fn test_not_in_never_matches_null() {
        let expr = Expr::not_in("VEH_DMAG_SCL_1_ID", ["NO DAMAGE", "INVALID VALUE"]);
        let mask = evaluate_expr(&units(), &expr).unwrap();
        assert_eq!(mask_to_bools(&mask), vec![true, true, false, false, true]);
    }

    #[test]
    fn test_or_with_null_side() {
        let expr = Expr::Or(vec![
            Expr::contains("VEH_DMAG_SCL_1_ID", "10"),
            Expr::eq("DEATH_CNT", 1_i64),
        ]);
        let filtered = filter_by(&units(), expr).unwrap();
        let ids = filtered
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_column_fails() {
        let err = evaluate_expr(&units(), &Expr::contains("CHARGE", "SPEED")).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ColumnNotFound { .. })));

        let err = evaluate_expr(&units(), &Expr::is_in("CHARGE", Vec::<&str>::new())).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ColumnNotFound { .. })));
    }

    #[test]
    fn test_not_keeps_nulls_null() {
        let expr = Expr::Not(Box::new(Expr::contains("VEH_DMAG_SCL_1_ID", "DAMAGED")));
        let mask = evaluate_expr(&units(), &expr).unwrap();
        assert_eq!(mask_to_bools(&mask), vec![false, false, false, true, false]);
        assert!(mask.is_null(2));
    }

    #[test]
    fn test_is_in_and_not_null() {
        let expr = Expr::And(vec![
            Expr::not_null("DEATH_CNT"),
            Expr::is_in("VEH_DMAG_SCL_1_ID", ["DAMAGED 5", "NO DAMAGE", "DAMAGED 10"]),
        ]);
        let filtered = filter_by(&units(), expr).unwrap();
        let ids = filtered
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        // Row 4 matches the set but has no death count
        assert_eq!(ids.values().to_vec(), vec![1, 2]);
    }
}
