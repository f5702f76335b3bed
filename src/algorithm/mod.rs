//! Query engine for crash tables
//!
//! This module contains the table primitives (join, deduplication,
//! grouping and ranking) and the eight analyses built on them.

pub mod aggregate;
pub mod analytics;
pub mod answer;
pub mod join;

pub use analytics::Analysis;
pub use answer::Answer;
pub use join::{drop_duplicates, inner_join};
