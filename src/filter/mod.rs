//! Filtering capabilities for crash tables
//!
//! Filters are built as [`Expr`] trees and applied to Arrow record batches.

pub mod core;
pub mod expr;

pub use core::{BatchFilter, filter_record_batch};
pub use expr::{ExpressionFilter, Expr, LiteralValue, evaluate_expr, filter_by};
