//! Utility types and functions for data operations

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int,
    Float,
    Bool,
    Str,
    Timestamp,
}

impl DType {
    /// Check if type takes part in numeric aggregates
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Float | DType::Int | DType::Bool)
    }

    /// Common type two columns can be unified into, if any.
    ///
    /// Int and Float widen to Float; Bool widens to Int. Any other pair of
    /// distinct types has no common representation.
    pub fn unify(self, other: DType) -> Option<DType> {
        use DType::*;
        match (self, other) {
            (a, b) if a == b => Some(a),
            (Int, Float) | (Float, Int) | (Bool, Float) | (Float, Bool) => Some(Float),
            (Bool, Int) | (Int, Bool) => Some(Int),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Float => write!(f, "float64"),
            DType::Int => write!(f, "int64"),
            DType::Bool => write!(f, "bool"),
            DType::Str => write!(f, "string"),
            DType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Check that an operand has the expected length
pub(crate) fn check_length(context: &str, expected: usize, actual: usize) -> super::Result<()> {
    if expected != actual {
        return Err(super::DataError::alignment(context, expected, actual));
    }
    Ok(())
}

/// Compute a linearly interpolated quantile over sorted, non-empty data
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let n = sorted.len();
    let index = (n as f64 - 1.0) * q;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        Some(sorted[lower])
    } else {
        let weight = index - lower as f64;
        Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }
}

/// Sort floats in ascending order; callers never pass NaN
pub(crate) fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}
