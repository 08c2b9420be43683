//! Column data structure for holding homogeneous data
//!
//! A Column is a named, typed, one-dimensional sequence of values with a
//! parallel validity mask. It's the building block of Tables. Aggregates
//! exclude null values; elementwise transformations propagate them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::builder::dtype_name;
use super::utils::{check_length, quantile_sorted, sort_floats};
use super::*;

/// Typed storage behind a Column. Slots marked invalid hold a placeholder.
#[derive(Clone, Debug)]
pub enum ColumnData {
    Int(IntArray),
    Float(FloatArray),
    Bool(BoolArray),
    Str(StringArray),
    Timestamp(TimestampArray),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(arr) => arr.len(),
            ColumnData::Float(arr) => arr.len(),
            ColumnData::Bool(arr) => arr.len(),
            ColumnData::Str(arr) => arr.len(),
            ColumnData::Timestamp(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Int(_) => DType::Int,
            ColumnData::Float(_) => DType::Float,
            ColumnData::Bool(_) => DType::Bool,
            ColumnData::Str(_) => DType::Str,
            ColumnData::Timestamp(_) => DType::Timestamp,
        }
    }

    /// Gather slots by position; `None` yields a placeholder slot
    fn gather(&self, positions: &[Option<usize>]) -> ColumnData {
        match self {
            ColumnData::Int(arr) => {
                ColumnData::Int(positions.iter().map(|p| p.map_or(0, |p| arr[p])).collect())
            }
            ColumnData::Float(arr) => ColumnData::Float(
                positions
                    .iter()
                    .map(|p| p.map_or(f64::NAN, |p| arr[p]))
                    .collect(),
            ),
            ColumnData::Bool(arr) => {
                ColumnData::Bool(positions.iter().map(|p| p.is_some_and(|p| arr[p])).collect())
            }
            ColumnData::Str(arr) => ColumnData::Str(
                positions
                    .iter()
                    .map(|p| p.map(|p| arr[p].clone()).unwrap_or_default())
                    .collect(),
            ),
            ColumnData::Timestamp(arr) => ColumnData::Timestamp(
                positions
                    .iter()
                    .map(|p| p.map(|p| arr[p]).unwrap_or_default())
                    .collect(),
            ),
        }
    }
}

/// A named, typed column with a null mask
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    data: ColumnData,
    valid: BoolArray,
}

impl Column {
    /// Create a column where every slot is valid (float NaN excepted)
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let valid = match &data {
            ColumnData::Float(arr) => arr.iter().map(|v| !v.is_nan()).collect(),
            other => BoolArray::from_elem(other.len(), true),
        };
        Self {
            name: name.into(),
            data,
            valid,
        }
    }

    /// Create a column with an explicit validity mask
    pub fn with_validity(
        name: impl Into<String>,
        data: ColumnData,
        valid: impl Into<BoolArray>,
    ) -> Result<Self> {
        let name = name.into();
        let mut valid = valid.into();
        check_length(&format!("validity of column '{}'", name), data.len(), valid.len())?;
        if let ColumnData::Float(arr) = &data {
            for (slot, v) in valid.iter_mut().zip(arr.iter()) {
                *slot = *slot && !v.is_nan();
            }
        }
        Ok(Self { name, data, valid })
    }

    /// Create a new Int column
    pub fn int(name: impl Into<String>, data: impl Into<IntArray>) -> Self {
        Self::new(name, ColumnData::Int(data.into()))
    }

    /// Create a new Float column; NaN entries are null
    pub fn float(name: impl Into<String>, data: impl Into<FloatArray>) -> Self {
        Self::new(name, ColumnData::Float(data.into()))
    }

    /// Create a new Bool column
    pub fn bool(name: impl Into<String>, data: impl Into<BoolArray>) -> Self {
        Self::new(name, ColumnData::Bool(data.into()))
    }

    /// Create a new string column
    pub fn string<I, S>(name: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: StringArray = data.into_iter().map(Into::into).collect();
        Self::new(name, ColumnData::Str(values))
    }

    /// Create a new timestamp column
    pub fn timestamp(name: impl Into<String>, data: TimestampArray) -> Self {
        Self::new(name, ColumnData::Timestamp(data))
    }

    /// Create an Int column with nulls
    pub fn int_opt(name: impl Into<String>, data: Vec<Option<i64>>) -> Self {
        let valid: BoolArray = data.iter().map(Option::is_some).collect();
        let values: IntArray = data.into_iter().map(Option::unwrap_or_default).collect();
        Self {
            name: name.into(),
            data: ColumnData::Int(values),
            valid,
        }
    }

    /// Create a Float column with nulls
    pub fn float_opt(name: impl Into<String>, data: Vec<Option<f64>>) -> Self {
        let values: FloatArray = data.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Self::float(name, values)
    }

    /// Create a Bool column with nulls
    pub fn bool_opt(name: impl Into<String>, data: Vec<Option<bool>>) -> Self {
        let valid: BoolArray = data.iter().map(Option::is_some).collect();
        let values: BoolArray = data.into_iter().map(Option::unwrap_or_default).collect();
        Self {
            name: name.into(),
            data: ColumnData::Bool(values),
            valid,
        }
    }

    /// Create a string column with nulls
    pub fn string_opt<S: Into<String>>(name: impl Into<String>, data: Vec<Option<S>>) -> Self {
        let valid: BoolArray = data.iter().map(Option::is_some).collect();
        let values: StringArray = data
            .into_iter()
            .map(|v| v.map(Into::into).unwrap_or_default())
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Str(values),
            valid,
        }
    }

    /// Create a column of `len` nulls
    pub fn nulls(name: impl Into<String>, dtype: DType, len: usize) -> Self {
        let positions = vec![None; len];
        let empty = match dtype {
            DType::Int => ColumnData::Int(IntArray::from(Vec::new())),
            DType::Float => ColumnData::Float(FloatArray::from(Vec::new())),
            DType::Bool => ColumnData::Bool(BoolArray::from(Vec::new())),
            DType::Str => ColumnData::Str(Vec::new()),
            DType::Timestamp => ColumnData::Timestamp(Vec::new()),
        };
        Self {
            name: name.into(),
            data: empty.gather(&positions),
            valid: BoolArray::from_elem(len, false),
        }
    }

    /// Build a column of the given type from dynamically typed values
    pub fn from_values(name: impl Into<String>, dtype: DType, values: &[Value]) -> Result<Self> {
        let name = name.into();
        let mut valid = Vec::with_capacity(values.len());
        let mismatch = |v: &Value| DataError::TypeMismatch {
            operation: format!("building column '{}'", name),
            expected: dtype_name(dtype),
            actual: v.dtype().map_or_else(|| "tuple".to_string(), |t| t.to_string()),
        };

        let data = match dtype {
            DType::Int => ColumnData::Int(
                collect_typed(values, 0, &mut valid, Value::as_i64, mismatch)?.into(),
            ),
            DType::Float => ColumnData::Float(
                collect_typed(values, f64::NAN, &mut valid, Value::as_f64, mismatch)?.into(),
            ),
            DType::Bool => ColumnData::Bool(
                collect_typed(values, false, &mut valid, Value::as_bool, mismatch)?.into(),
            ),
            DType::Str => ColumnData::Str(collect_typed(
                values,
                String::new(),
                &mut valid,
                |v| v.as_str().map(str::to_string),
                mismatch,
            )?),
            DType::Timestamp => ColumnData::Timestamp(collect_typed(
                values,
                NaiveDateTime::default(),
                &mut valid,
                Value::as_timestamp,
                mismatch,
            )?),
        };

        Ok(Self {
            name,
            data,
            valid: valid.into(),
        })
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the column under a new name
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Typed storage; null slots hold placeholders
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Validity mask, `true` where a value is present
    pub fn validity(&self) -> &BoolArray {
        &self.valid
    }

    /// Get the length of the column
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical type of the column
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Whether the slot at `idx` is null; out-of-range slots are not null
    pub fn is_null(&self, idx: usize) -> bool {
        self.valid.get(idx).is_some_and(|v| !v)
    }

    /// Positions holding nulls
    pub fn null_positions(&self) -> Vec<usize> {
        self.valid
            .iter()
            .enumerate()
            .filter(|(_, v)| !**v)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of null slots
    pub fn null_count(&self) -> usize {
        self.valid.iter().filter(|v| !**v).count()
    }

    /// Get a value at index; `Value::Null` for null slots
    pub fn get(&self, idx: usize) -> Option<Value> {
        if idx >= self.len() {
            return None;
        }
        if !self.valid[idx] {
            return Some(Value::Null);
        }

        Some(match &self.data {
            ColumnData::Int(arr) => Value::Int(arr[idx]),
            ColumnData::Float(arr) => Value::Float(arr[idx]),
            ColumnData::Bool(arr) => Value::Bool(arr[idx]),
            ColumnData::Str(arr) => Value::Str(arr[idx].clone()),
            ColumnData::Timestamp(arr) => Value::Timestamp(arr[idx]),
        })
    }

    /// Iterate over values in order
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(|i| self.get(i).unwrap_or_default())
    }

    /// Collect all values
    pub fn to_values(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Numeric view of every slot, `None` for nulls
    pub fn to_f64(&self) -> Result<Vec<Option<f64>>> {
        self.require_numeric("numeric conversion")?;
        Ok(self.iter().map(|v| v.as_f64()).collect())
    }

    fn require_numeric(&self, operation: &str) -> Result<()> {
        if !self.dtype().is_numeric() {
            return Err(DataError::type_mismatch(
                format!("{} on column '{}'", operation, self.name),
                "numeric",
                self.dtype(),
            ));
        }
        Ok(())
    }

    /// Non-null values as floats, in order
    fn valid_f64(&self, operation: &str) -> Result<Vec<f64>> {
        self.require_numeric(operation)?;
        Ok(self.iter().filter_map(|v| v.as_f64()).collect())
    }

    /// Gather rows by position
    pub fn take(&self, positions: &[usize]) -> Result<Self> {
        let len = self.len();
        if let Some(&bad) = positions.iter().find(|&&p| p >= len) {
            return Err(DataError::IndexOutOfBounds { index: bad, len });
        }
        let opt: Vec<Option<usize>> = positions.iter().copied().map(Some).collect();
        Ok(self.gather_unchecked(&opt))
    }

    /// Gather rows by position, `None` producing a null slot
    pub fn take_opt(&self, positions: &[Option<usize>]) -> Result<Self> {
        let len = self.len();
        if let Some(bad) = positions.iter().flatten().find(|&&p| p >= len) {
            return Err(DataError::IndexOutOfBounds { index: *bad, len });
        }
        Ok(self.gather_unchecked(positions))
    }

    fn gather_unchecked(&self, positions: &[Option<usize>]) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.gather(positions),
            valid: positions
                .iter()
                .map(|p| p.is_some_and(|p| self.valid[p]))
                .collect(),
        }
    }

    /// Get a positional, half-open slice of the column
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<Self> {
        if range.end > self.len() {
            return Err(DataError::IndexOutOfBounds {
                index: range.end,
                len: self.len(),
            });
        }
        let positions: Vec<usize> = range.collect();
        self.take(&positions)
    }

    /// Positional slice with bounds clamped to the column length
    pub(crate) fn slice_clamped(&self, range: std::ops::Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let positions: Vec<Option<usize>> = (start..end).map(Some).collect();
        self.gather_unchecked(&positions)
    }

    /// Keep slots where the mask is true
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        check_length(
            &format!("mask for column '{}'", self.name),
            self.len(),
            mask.len(),
        )?;
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i)
            .collect();
        self.take(&positions)
    }

    /// First `n` values
    pub fn head(&self, n: usize) -> Self {
        let positions: Vec<Option<usize>> = (0..n.min(self.len())).map(Some).collect();
        self.gather_unchecked(&positions)
    }

    /// Boolean column, true where the value is null
    pub fn isnull(&self) -> Column {
        Column::bool(self.name.clone(), self.valid.mapv(|v| !v))
    }

    /// Boolean column, true where the value is present
    pub fn notnull(&self) -> Column {
        Column::bool(self.name.clone(), self.valid.clone())
    }

    /// Replace nulls with `value`, widening the column type if needed
    pub fn fillna(&self, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let Some(fill_type) = value.dtype() else {
            return Ok(self.clone());
        };
        let dtype = self
            .dtype()
            .unify(fill_type)
            .ok_or_else(|| DataError::TypeMismatch {
                operation: format!("fillna on column '{}'", self.name),
                expected: dtype_name(self.dtype()),
                actual: fill_type.to_string(),
            })?;
        let values: Vec<Value> = self
            .iter()
            .map(|v| if v.is_null() { value.clone() } else { v })
            .collect();
        Column::from_values(self.name.clone(), dtype, &values)
    }

    /// Distinct values in order of first appearance
    pub fn unique(&self) -> Vec<Value> {
        self.iter()
            .collect::<IndexSet<Value>>()
            .into_iter()
            .collect()
    }

    /// Apply a function to every non-null value; nulls stay null.
    ///
    /// The output type is inferred from the returned values.
    pub fn apply<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Value) -> Value,
    {
        let mut builder = ColumnBuilder::new(self.name.clone());
        builder.reserve(self.len());
        for value in self.iter() {
            if value.is_null() {
                builder.push(Value::Null)?;
            } else {
                builder.push(f(&value))?;
            }
        }
        builder.finish()
    }

    /// Apply a numeric function to every non-null value, producing floats.
    ///
    /// Results that are NaN become nulls.
    pub fn map_f64<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        let values = self.to_f64()?;
        let mapped: FloatArray = values
            .into_iter()
            .map(|v| v.map_or(f64::NAN, &f))
            .collect();
        Ok(Column::float(self.name.clone(), mapped))
    }

    /// Elementwise arithmetic against another column of equal length
    pub fn arith(&self, op: ArithOp, other: &Column) -> Result<Self> {
        check_length(
            &format!("{} of '{}' and '{}'", op, self.name, other.name),
            self.len(),
            other.len(),
        )?;
        other.require_numeric(&op.to_string())?;
        self.arith_with(op, other.dtype(), |i| other.get(i).unwrap_or_default())
    }

    /// Elementwise arithmetic against a scalar
    pub fn arith_scalar(&self, op: ArithOp, scalar: impl Into<Value>) -> Result<Self> {
        let scalar = scalar.into();
        let scalar_type = scalar
            .dtype()
            .filter(DType::is_numeric)
            .ok_or_else(|| DataError::TypeMismatch {
                operation: format!("{} on column '{}'", op, self.name),
                expected: "numeric scalar",
                actual: scalar.dtype().map_or_else(|| "null".to_string(), |t| t.to_string()),
            })?;
        self.arith_with(op, scalar_type, |_| scalar.clone())
    }

    fn arith_with<F>(&self, op: ArithOp, rhs_type: DType, rhs: F) -> Result<Self>
    where
        F: Fn(usize) -> Value,
    {
        self.require_numeric(&op.to_string())?;
        let integral = matches!(self.dtype(), DType::Int | DType::Bool)
            && matches!(rhs_type, DType::Int | DType::Bool)
            && op != ArithOp::Div;

        if integral {
            let values: Vec<Option<i64>> = (0..self.len())
                .map(|i| {
                    let lhs = self.get(i).and_then(|v| v.as_i64())?;
                    let rhs = rhs(i).as_i64()?;
                    op.apply_i64(lhs, rhs)
                })
                .collect();
            return Ok(Column::int_opt(self.name.clone(), values));
        }

        let values: FloatArray = (0..self.len())
            .map(|i| {
                let lhs = self.get(i).and_then(|v| v.as_f64());
                let rhs = rhs(i).as_f64();
                match (lhs, rhs) {
                    (Some(a), Some(b)) => op.apply_f64(a, b),
                    _ => f64::NAN,
                }
            })
            .collect();
        Ok(Column::float(self.name.clone(), values))
    }

    pub fn add(&self, other: &Column) -> Result<Self> {
        self.arith(ArithOp::Add, other)
    }

    pub fn sub(&self, other: &Column) -> Result<Self> {
        self.arith(ArithOp::Sub, other)
    }

    pub fn mul(&self, other: &Column) -> Result<Self> {
        self.arith(ArithOp::Mul, other)
    }

    pub fn div(&self, other: &Column) -> Result<Self> {
        self.arith(ArithOp::Div, other)
    }

    pub fn add_scalar(&self, scalar: impl Into<Value>) -> Result<Self> {
        self.arith_scalar(ArithOp::Add, scalar)
    }

    pub fn sub_scalar(&self, scalar: impl Into<Value>) -> Result<Self> {
        self.arith_scalar(ArithOp::Sub, scalar)
    }

    pub fn mul_scalar(&self, scalar: impl Into<Value>) -> Result<Self> {
        self.arith_scalar(ArithOp::Mul, scalar)
    }

    pub fn div_scalar(&self, scalar: impl Into<Value>) -> Result<Self> {
        self.arith_scalar(ArithOp::Div, scalar)
    }

    /// Number of non-null values
    pub fn count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Sum of non-null values. Integer and boolean columns sum to an integer.
    pub fn sum(&self) -> Result<Value> {
        self.require_numeric("sum")?;
        match &self.data {
            ColumnData::Int(_) | ColumnData::Bool(_) => {
                let mut total: i64 = 0;
                for v in self.iter().filter_map(|v| v.as_i64()) {
                    match total.checked_add(v) {
                        Some(t) => total = t,
                        None => return Ok(Value::Float(self.valid_f64("sum")?.iter().sum())),
                    }
                }
                Ok(Value::Int(total))
            }
            _ => Ok(Value::Float(self.valid_f64("sum")?.iter().sum())),
        }
    }

    /// Product of non-null values
    pub fn prod(&self) -> Result<Value> {
        self.require_numeric("prod")?;
        match &self.data {
            ColumnData::Int(_) | ColumnData::Bool(_) => {
                let mut total: i64 = 1;
                for v in self.iter().filter_map(|v| v.as_i64()) {
                    match total.checked_mul(v) {
                        Some(t) => total = t,
                        None => {
                            return Ok(Value::Float(self.valid_f64("prod")?.iter().product()));
                        }
                    }
                }
                Ok(Value::Int(total))
            }
            _ => Ok(Value::Float(self.valid_f64("prod")?.iter().product())),
        }
    }

    /// Mean of non-null values; `None` when there are none
    pub fn mean(&self) -> Result<Option<f64>> {
        let values = self.valid_f64("mean")?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    /// Median of non-null values
    pub fn median(&self) -> Result<Option<f64>> {
        let mut values = self.valid_f64("median")?;
        sort_floats(&mut values);
        Ok(quantile_sorted(&values, 0.5))
    }

    /// Sample variance (ddof = 1) of non-null values
    pub fn var(&self) -> Result<Option<f64>> {
        let values = self.valid_f64("var")?;
        let n = values.len();
        if n < 2 {
            return Ok(None);
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Ok(Some(ss / (n - 1) as f64))
    }

    /// Sample standard deviation (ddof = 1) of non-null values
    pub fn std(&self) -> Result<Option<f64>> {
        Ok(self.var()?.map(f64::sqrt))
    }

    /// Smallest non-null value; `Value::Null` if there is none
    pub fn min(&self) -> Result<Value> {
        Ok(self.iter().filter(|v| !v.is_null()).min().unwrap_or_default())
    }

    /// Largest non-null value; `Value::Null` if there is none
    pub fn max(&self) -> Result<Value> {
        Ok(self.iter().filter(|v| !v.is_null()).max().unwrap_or_default())
    }

    /// First non-null value
    pub fn first(&self) -> Value {
        self.iter().find(|v| !v.is_null()).unwrap_or_default()
    }

    /// Last non-null value
    pub fn last(&self) -> Value {
        (0..self.len())
            .rev()
            .filter_map(|i| self.get(i))
            .find(|v| !v.is_null())
            .unwrap_or_default()
    }

    /// Apply a named reduction
    pub fn aggregate(&self, func: AggFunc) -> Result<Value> {
        let float = |v: Option<f64>| Value::from(v);
        match func {
            AggFunc::Count => Ok(Value::Int(self.count() as i64)),
            AggFunc::Sum => self.sum(),
            AggFunc::Prod => self.prod(),
            AggFunc::Mean => self.mean().map(float),
            AggFunc::Median => self.median().map(float),
            AggFunc::Std => self.std().map(float),
            AggFunc::Var => self.var().map(float),
            AggFunc::Min => self.min(),
            AggFunc::Max => self.max(),
            AggFunc::First => Ok(self.first()),
            AggFunc::Last => Ok(self.last()),
        }
    }

    /// Compute summary statistics
    pub fn describe(&self) -> Result<ColumnStats> {
        if !self.dtype().is_numeric() {
            let unique = self
                .iter()
                .filter(|v| !v.is_null())
                .collect::<IndexSet<Value>>()
                .len();
            return Ok(ColumnStats {
                count: self.count(),
                unique_count: Some(unique),
                ..ColumnStats::empty()
            });
        }

        let mut values = self.valid_f64("describe")?;
        if values.is_empty() {
            return Ok(ColumnStats::empty());
        }
        sort_floats(&mut values);

        Ok(ColumnStats {
            count: values.len(),
            mean: self.mean()?.unwrap_or(f64::NAN),
            std: self.std()?.unwrap_or(f64::NAN),
            min: values[0],
            q25: quantile_sorted(&values, 0.25).unwrap_or(f64::NAN),
            q50: quantile_sorted(&values, 0.5).unwrap_or(f64::NAN),
            q75: quantile_sorted(&values, 0.75).unwrap_or(f64::NAN),
            max: values[values.len() - 1],
            unique_count: None,
        })
    }
}

fn collect_typed<T, E, M>(
    values: &[Value],
    placeholder: T,
    valid: &mut Vec<bool>,
    extract: E,
    mismatch: M,
) -> Result<Vec<T>>
where
    T: Clone,
    E: Fn(&Value) -> Option<T>,
    M: Fn(&Value) -> DataError,
{
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if value.is_null() {
            out.push(placeholder.clone());
            valid.push(false);
        } else {
            out.push(extract(value).ok_or_else(|| mismatch(value))?);
            valid.push(true);
        }
    }
    Ok(out)
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.dtype() == other.dtype()
            && self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column '{}' ({}, {} values, {} null)",
            self.name,
            self.dtype(),
            self.len(),
            self.null_count()
        )
    }
}

/// Elementwise arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn apply_f64(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        }
    }

    // Integer arithmetic wraps on overflow.
    fn apply_i64(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithOp::Add => Some(a.wrapping_add(b)),
            ArithOp::Sub => Some(a.wrapping_sub(b)),
            ArithOp::Mul => Some(a.wrapping_mul(b)),
            ArithOp::Div => a.checked_div(b),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
        };
        write!(f, "{}", name)
    }
}

/// Named reduction functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Prod,
    Std,
    Var,
    First,
    Last,
}

impl AggFunc {
    /// Name used in output and parsing
    pub fn name(&self) -> &'static str {
        match self {
            AggFunc::Count => "count",
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Median => "median",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Prod => "prod",
            AggFunc::Std => "std",
            AggFunc::Var => "var",
            AggFunc::First => "first",
            AggFunc::Last => "last",
        }
    }

    /// Type of the result when reducing a column of type `input`
    pub fn output_dtype(&self, input: DType) -> DType {
        match self {
            AggFunc::Count => DType::Int,
            AggFunc::Sum | AggFunc::Prod => match input {
                DType::Int | DType::Bool => DType::Int,
                _ => DType::Float,
            },
            AggFunc::Mean | AggFunc::Median | AggFunc::Std | AggFunc::Var => DType::Float,
            AggFunc::Min | AggFunc::Max | AggFunc::First | AggFunc::Last => input,
        }
    }
}

impl FromStr for AggFunc {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "count" => Ok(AggFunc::Count),
            "sum" => Ok(AggFunc::Sum),
            "mean" | "avg" => Ok(AggFunc::Mean),
            "median" => Ok(AggFunc::Median),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "prod" | "product" => Ok(AggFunc::Prod),
            "std" => Ok(AggFunc::Std),
            "var" => Ok(AggFunc::Var),
            "first" => Ok(AggFunc::First),
            "last" => Ok(AggFunc::Last),
            _ => Err(DataError::UnsupportedConfig {
                option: "aggregation function",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Statistical summary of a column
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
    pub unique_count: Option<usize>,
}

impl ColumnStats {
    pub(crate) fn empty() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            q50: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
            unique_count: None,
        }
    }
}
