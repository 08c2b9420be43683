//! Builder pattern for constructing Tables and Columns

use indexmap::IndexMap;

use super::*;

/// Builder that accumulates dynamically typed values into a typed Column.
///
/// Without a declared type the column type is inferred from the non-null
/// values, widening Int to Float where both appear. An all-null column is
/// built with the fallback type, Float unless set with
/// [`ColumnBuilder::or_dtype`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    dtype: Option<DType>,
    fixed: bool,
    fallback: DType,
    values: Vec<Value>,
}

impl ColumnBuilder {
    /// Create a builder that infers its type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dtype: None,
            fixed: false,
            fallback: DType::Float,
            values: Vec::new(),
        }
    }

    /// Create a builder for a known type
    pub fn with_dtype(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype: Some(dtype),
            fixed: true,
            fallback: dtype,
            values: Vec::new(),
        }
    }

    /// Type used when only nulls are pushed
    pub fn or_dtype(mut self, fallback: DType) -> Self {
        self.fallback = fallback;
        self
    }

    /// Reserve space for `additional` values
    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    /// Append a value
    pub fn push(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            self.values.push(Value::Null);
            return Ok(());
        }

        let value_type = value.dtype().ok_or_else(|| DataError::TypeMismatch {
            operation: format!("column '{}'", self.name),
            expected: "scalar value",
            actual: "tuple".to_string(),
        })?;

        self.dtype = match self.dtype {
            None => Some(value_type),
            Some(current) => {
                let unified = current.unify(value_type);
                match unified {
                    Some(t) if !self.fixed || t == current => Some(t),
                    _ => {
                        return Err(DataError::TypeMismatch {
                            operation: format!("column '{}'", self.name),
                            expected: dtype_name(current),
                            actual: value_type.to_string(),
                        });
                    }
                }
            }
        };

        self.values.push(value);
        Ok(())
    }

    /// Number of values pushed so far
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the Column
    pub fn finish(self) -> Result<Column> {
        let dtype = self.dtype.unwrap_or(self.fallback);
        Column::from_values(self.name, dtype, &self.values)
    }
}

pub(crate) fn dtype_name(dtype: DType) -> &'static str {
    match dtype {
        DType::Int => "int64",
        DType::Float => "float64",
        DType::Bool => "bool",
        DType::Str => "string",
        DType::Timestamp => "timestamp",
    }
}

/// Builder for creating Tables
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: IndexMap<String, Column>,
    nrows: Option<usize>,
    index: Option<Index>,
}

impl TableBuilder {
    /// Create a new TableBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the Table
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        let name = column.name().to_string();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        match self.nrows {
            Some(n) if column.len() != n => {
                return Err(DataError::alignment(
                    format!("column '{}'", name),
                    n,
                    column.len(),
                ));
            }
            None => {
                self.nrows = Some(column.len());
            }
            _ => {}
        }

        self.columns.insert(name, column);
        Ok(self)
    }

    /// Set the index
    pub fn with_index(mut self, index: Index) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the Table
    pub fn build(self) -> Result<Table> {
        let nrows = match (self.nrows, &self.index) {
            (Some(n), _) => n,
            (None, Some(index)) => index.len(),
            (None, None) => 0,
        };

        let index = match self.index {
            Some(index) => {
                if index.len() != nrows {
                    return Err(DataError::alignment("table index", nrows, index.len()));
                }
                index
            }
            None => Index::range(nrows),
        };

        Ok(Table::from_parts(self.columns, index, nrows))
    }
}
