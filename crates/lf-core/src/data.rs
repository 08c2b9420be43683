//! Core data structures for LabelFrame
//!
//! This module provides the in-memory labeled table and the transformations
//! defined over it: selection, filtering, grouping, pivoting, ranking and
//! merging. Every transformation returns a new value unless it is one of the
//! explicitly named `*_in_place` entry points.

mod builder;
mod column;
mod group;
mod index;
mod merge;
mod query;
mod rank;
mod reshape;
mod sort;
mod table;
mod traits;
mod utils;
mod value;

#[cfg(test)]
mod tests;

// Re-exports
pub use builder::{ColumnBuilder, TableBuilder};
pub use column::{AggFunc, ArithOp, Column, ColumnData, ColumnStats};
pub use group::{GroupBy, GroupOptions};
pub use index::{Index, LabelIndex, RangeIndex};
pub use merge::{JoinType, MergeOptions, merge};
pub use query::{CmpOp, Predicate};
pub use rank::{RankMethod, RankOptions};
pub use reshape::MeltOptions;
pub use table::{DropHow, Row, RowIter, Table};
pub use traits::Reducer;
pub use utils::DType;
pub use value::Value;

// Type aliases for column storage
pub type FloatArray = ndarray::Array1<f64>;
pub type IntArray = ndarray::Array1<i64>;
pub type BoolArray = ndarray::Array1<bool>;
pub type StringArray = Vec<String>;
pub type TimestampArray = Vec<chrono::NaiveDateTime>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Alignment error in {context}: expected length {expected}, got {actual}")]
    Alignment {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Type mismatch in {operation}: expected {expected}, got {actual}")]
    TypeMismatch {
        operation: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Column '{name}' not found. Available columns: {available:?}")]
    ColumnNotFound { name: String, available: Vec<String> },

    #[error("Label {label} not found in index")]
    LabelNotFound { label: String },

    #[error("Merge key '{key}' not found in {side} table")]
    MergeKeyNotFound { key: String, side: &'static str },

    #[error(
        "Ambiguous duplicate: {count} values for cell ({index}, {column}) and no aggregation function supplied"
    )]
    AmbiguousDuplicate {
        index: String,
        column: String,
        count: usize,
    },

    #[error("Unsupported {option}: '{value}'")]
    UnsupportedConfig { option: &'static str, value: String },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl DataError {
    pub(crate) fn type_mismatch(
        operation: impl Into<String>,
        expected: &'static str,
        actual: DType,
    ) -> Self {
        DataError::TypeMismatch {
            operation: operation.into(),
            expected,
            actual: actual.to_string(),
        }
    }

    pub(crate) fn alignment(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        DataError::Alignment {
            context: context.into(),
            expected,
            actual,
        }
    }
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
