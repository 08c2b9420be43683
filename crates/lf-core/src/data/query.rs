//! Boolean masks and row selection
//!
//! A mask is a Bool Column aligned to a Table. Comparisons build masks,
//! `and`/`or`/`invert` combine them elementwise, and the Table selectors
//! apply them. Positional (`iloc`) and label (`loc`) selection are separate
//! operations.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::utils::check_length;
use super::*;

/// Comparison operators for building masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Gt => ordering == Greater,
            CmpOp::Ge => ordering != Less,
            CmpOp::Lt => ordering == Less,
            CmpOp::Le => ordering != Greater,
            CmpOp::Eq => ordering == Equal,
            CmpOp::Ne => ordering != Equal,
        }
    }
}

impl FromStr for CmpOp {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ">" | "gt" => Ok(CmpOp::Gt),
            ">=" | "ge" => Ok(CmpOp::Ge),
            "<" | "lt" => Ok(CmpOp::Lt),
            "<=" | "le" => Ok(CmpOp::Le),
            "==" | "eq" => Ok(CmpOp::Eq),
            "!=" | "ne" => Ok(CmpOp::Ne),
            _ => Err(DataError::UnsupportedConfig {
                option: "comparison operator",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        };
        write!(f, "{}", symbol)
    }
}

fn comparable(a: DType, b: DType) -> bool {
    a == b || (a.is_numeric() && b.is_numeric())
}

impl Column {
    /// Compare every value with a scalar.
    ///
    /// A null on either side compares false, except under `Ne` where it
    /// compares true.
    pub fn compare(&self, op: CmpOp, value: impl Into<Value>) -> Result<Column> {
        let value = value.into();
        if let Some(dtype) = value.dtype() {
            if !comparable(self.dtype(), dtype) {
                return Err(DataError::type_mismatch(
                    format!("comparison '{}' on column '{}'", op, self.name()),
                    dtype_label(self.dtype()),
                    dtype,
                ));
            }
        } else if matches!(value, Value::Tuple(_)) {
            return Err(DataError::TypeMismatch {
                operation: format!("comparison '{}' on column '{}'", op, self.name()),
                expected: dtype_label(self.dtype()),
                actual: "tuple".to_string(),
            });
        }

        // Bool against a number compares as 0/1
        let mixed_bool = (self.dtype() == DType::Bool) != matches!(value, Value::Bool(_));
        let value = if mixed_bool { value.bool_as_int() } else { value };

        let null_result = op == CmpOp::Ne;
        let mask: BoolArray = self
            .iter()
            .map(|v| {
                if v.is_null() || value.is_null() {
                    null_result
                } else if mixed_bool {
                    op.holds(v.bool_as_int().cmp(&value))
                } else {
                    op.holds(v.cmp(&value))
                }
            })
            .collect();

        Ok(Column::bool(self.name().to_string(), mask))
    }

    pub fn gt(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Gt, value)
    }

    pub fn ge(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Ge, value)
    }

    pub fn lt(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Lt, value)
    }

    pub fn le(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Le, value)
    }

    pub fn eq(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Eq, value)
    }

    pub fn ne(&self, value: impl Into<Value>) -> Result<Column> {
        self.compare(CmpOp::Ne, value)
    }

    /// True where the value is one of `values`; nulls are never members.
    ///
    /// Bools match the integers 0 and 1.
    pub fn is_in(&self, values: &[Value]) -> Column {
        let set: std::collections::HashSet<Value> = values
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::bool_as_int)
            .collect();
        let mask: BoolArray = self
            .iter()
            .map(|v| !v.is_null() && set.contains(&v.bool_as_int()))
            .collect();
        Column::bool(self.name().to_string(), mask)
    }

    /// Mask view of a Bool column, nulls read as false
    pub(crate) fn mask_values(&self, context: &str) -> Result<Vec<bool>> {
        match self.data() {
            ColumnData::Bool(arr) => Ok(arr
                .iter()
                .zip(self.validity().iter())
                .map(|(v, valid)| *v && *valid)
                .collect()),
            _ => Err(DataError::type_mismatch(
                format!("{} with mask '{}'", context, self.name()),
                "bool",
                self.dtype(),
            )),
        }
    }

    fn combine_masks<F>(&self, other: &Column, name: &str, f: F) -> Result<Column>
    where
        F: Fn(bool, bool) -> bool,
    {
        let left = self.mask_values(name)?;
        let right = other.mask_values(name)?;
        check_length(&format!("mask {}", name), left.len(), right.len())?;
        let mask: BoolArray = left.iter().zip(&right).map(|(a, b)| f(*a, *b)).collect();
        Ok(Column::bool(self.name().to_string(), mask))
    }

    /// Elementwise logical and of two masks
    pub fn and(&self, other: &Column) -> Result<Column> {
        self.combine_masks(other, "and", |a, b| a && b)
    }

    /// Elementwise logical or of two masks
    pub fn or(&self, other: &Column) -> Result<Column> {
        self.combine_masks(other, "or", |a, b| a || b)
    }

    /// Elementwise logical negation of a mask
    pub fn invert(&self) -> Result<Column> {
        let mask: BoolArray = self.mask_values("invert")?.into_iter().map(|v| !v).collect();
        Ok(Column::bool(self.name().to_string(), mask))
    }
}

fn dtype_label(dtype: DType) -> &'static str {
    match dtype {
        DType::Int | DType::Float | DType::Bool => "numeric",
        DType::Str => "string",
        DType::Timestamp => "timestamp",
    }
}

/// Declarative row predicate over a Table's columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Compare {
        column: String,
        op: CmpOp,
        value: Value,
    },
    IsIn {
        column: String,
        values: Vec<Value>,
    },
    IsNull(String),
    NotNull(String),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// `column <op> value`
    pub fn compare(column: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::IsIn {
            column: column.into(),
            values,
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull(column.into())
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Predicate::NotNull(column.into())
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate to a mask aligned with `table`
    pub fn mask(&self, table: &Table) -> Result<Column> {
        match self {
            Predicate::Compare { column, op, value } => {
                table.column(column)?.compare(*op, value.clone())
            }
            Predicate::IsIn { column, values } => Ok(table.column(column)?.is_in(values)),
            Predicate::IsNull(column) => Ok(table.column(column)?.isnull()),
            Predicate::NotNull(column) => Ok(table.column(column)?.notnull()),
            Predicate::And(a, b) => a.mask(table)?.and(&b.mask(table)?),
            Predicate::Or(a, b) => a.mask(table)?.or(&b.mask(table)?),
            Predicate::Not(inner) => inner.mask(table)?.invert(),
        }
    }
}

impl Table {
    /// Rows at positions `range` (half-open); bounds past the end are clamped
    pub fn iloc(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.nrows);
        let start = range.start.min(end);
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), column.slice_clamped(start..end)))
            .collect();
        Self::from_parts(columns, self.index.slice(start..end), end - start)
    }

    /// Rows from label `start` to label `end`, both inclusive.
    ///
    /// Each bound resolves to the first row carrying it; every row between
    /// the two is returned, whatever its label.
    pub fn loc(&self, start: impl Into<Value>, end: impl Into<Value>) -> Result<Self> {
        let range = self.index.label_range(&start.into(), &end.into())?;
        Ok(self.iloc(range))
    }

    /// Rows carrying each of `labels`, in the order given
    pub fn loc_labels(&self, labels: &[Value]) -> Result<Self> {
        let mut positions = Vec::new();
        for label in labels {
            positions.extend(self.index.get_loc(label)?);
        }
        self.take_rows(&positions)
    }

    /// Single cell by row label and column name; the first row wins on duplicates
    pub fn at(&self, label: impl Into<Value>, column: &str) -> Result<Value> {
        let column = self.column(column)?;
        let pos = self.index.first_position(&label.into())?;
        Ok(column.get(pos).unwrap_or_default())
    }

    /// Single cell by row position and column name
    pub fn iat(&self, pos: usize, column: &str) -> Result<Value> {
        let column = self.column(column)?;
        column.get(pos).ok_or(DataError::IndexOutOfBounds {
            index: pos,
            len: self.nrows,
        })
    }

    /// Rows where the boolean mask is true
    pub fn filter(&self, mask: &Column) -> Result<Self> {
        check_length(
            &format!("mask '{}'", mask.name()),
            self.nrows,
            mask.len(),
        )?;
        let keep = mask.mask_values("filter")?;
        self.filter_positions(&keep)
    }

    /// Rows satisfying `predicate`
    pub fn query(&self, predicate: &Predicate) -> Result<Self> {
        let mask = predicate.mask(self)?;
        self.filter(&mask)
    }

    /// Rows for which the closure returns true
    pub fn filter_rows<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&Row) -> bool,
    {
        let keep: Vec<bool> = self.rows().map(|row| predicate(&row)).collect();
        self.filter_positions(&keep)
    }
}
