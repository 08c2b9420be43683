//! Traits for data operations

use super::*;

/// A reduction from a Column to a single value.
///
/// Implemented for every [`AggFunc`] and for closures, so group
/// aggregation accepts both named and custom reductions. Reducers may be
/// called from several threads at once.
pub trait Reducer: Send + Sync {
    /// Reduce the column to one value
    fn reduce(&self, column: &Column) -> Result<Value>;

    /// Label used in logs
    fn name(&self) -> &str {
        "custom"
    }

    /// Result type for an input type, when known ahead of reducing
    fn output_dtype(&self, _input: DType) -> Option<DType> {
        None
    }
}

impl Reducer for AggFunc {
    fn reduce(&self, column: &Column) -> Result<Value> {
        column.aggregate(*self)
    }

    fn name(&self) -> &str {
        AggFunc::name(self)
    }

    fn output_dtype(&self, input: DType) -> Option<DType> {
        Some(AggFunc::output_dtype(self, input))
    }
}

impl<F> Reducer for F
where
    F: Fn(&Column) -> Result<Value> + Send + Sync,
{
    fn reduce(&self, column: &Column) -> Result<Value> {
        self(column)
    }
}
