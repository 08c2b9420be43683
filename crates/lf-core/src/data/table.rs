//! Table implementation for labeled tabular data
//!
//! A Table is an ordered collection of equally long, uniquely named Columns
//! sharing one Index. Transformations return a new Table; the `*_in_place`
//! variants mutate the receiver instead and document which fields change.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::utils::check_length;
use super::*;

/// Main Table structure
#[derive(Clone, Debug)]
pub struct Table {
    pub(crate) columns: IndexMap<String, Column>,
    pub(crate) index: Index,
    pub(crate) nrows: usize,
}

/// Equal when shape, index and columns match, column order included
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.index == other.index
            && self.columns.len() == other.columns.len()
            && self.columns.iter().eq(other.columns.iter())
    }
}

impl Table {
    /// Create an empty Table
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
            index: Index::range(0),
            nrows: 0,
        }
    }

    pub(crate) fn from_parts(columns: IndexMap<String, Column>, index: Index, nrows: usize) -> Self {
        Self {
            columns,
            index,
            nrows,
        }
    }

    /// Create a Table from columns with a default range index
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = Column>,
    {
        let mut builder = TableBuilder::new();

        for column in columns.into_iter() {
            builder = builder.with_column(column)?;
        }

        builder.build()
    }

    /// Get the shape of the Table (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Get column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Column types in order
    pub fn dtypes(&self) -> Vec<(&str, DType)> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column.dtype()))
            .collect()
    }

    /// Row labels
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Iterate over columns in order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub(crate) fn column_not_found(&self, name: &str) -> DataError {
        DataError::ColumnNotFound {
            name: name.to_string(),
            available: self.columns.keys().cloned().collect(),
        }
    }

    /// Get a single column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| self.column_not_found(name))
    }

    /// Get a column by position
    pub fn column_at(&self, pos: usize) -> Option<&Column> {
        self.columns.get_index(pos).map(|(_, column)| column)
    }

    /// Select several columns into a new Table, keeping row order and index
    pub fn select<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = IndexMap::new();

        for name in names.into_iter() {
            let name = name.as_ref();
            let column = self.column(name)?;
            if columns.insert(name.to_string(), column.clone()).is_some() {
                return Err(DataError::DuplicateColumn(name.to_string()));
            }
        }

        Ok(Self::from_parts(columns, self.index.clone(), self.nrows))
    }

    /// Replace the index
    pub fn with_index(&self, index: Index) -> Result<Self> {
        check_length("table index", self.nrows, index.len())?;
        let mut table = self.clone();
        table.index = index;
        Ok(table)
    }

    /// Move a column into the index
    pub fn set_index(&self, name: &str) -> Result<Self> {
        let column = self.column(name)?;
        let index = Index::from_labels(column.to_values()).with_name(name);
        let mut columns = self.columns.clone();
        columns.shift_remove(name);
        Ok(Self::from_parts(columns, index, self.nrows))
    }

    /// Move the index back into leading columns and restore a range index.
    ///
    /// Tuple labels are split into one column per level. Unnamed levels are
    /// called `index` (single level) or `level_<n>`.
    pub fn reset_index(&self) -> Result<Self> {
        let labels = self.index.labels();
        let names = self.index.names();
        let levels = match labels.first() {
            Some(Value::Tuple(items)) => items.len(),
            _ => 1,
        };

        let level_name = |level: usize| -> String {
            match names.get(level) {
                Some(name) => name.to_string(),
                None if levels == 1 => "index".to_string(),
                None => format!("level_{}", level),
            }
        };

        let mut builders: Vec<ColumnBuilder> =
            (0..levels).map(|l| ColumnBuilder::new(level_name(l))).collect();

        for label in labels {
            let parts = match label {
                Value::Tuple(items) => items,
                other => vec![other],
            };
            check_length("index label levels", levels, parts.len())?;
            for (builder, item) in builders.iter_mut().zip(parts) {
                builder.push(item)?;
            }
        }

        let mut columns = IndexMap::new();
        for builder in builders {
            let column = builder.finish()?;
            let name = column.name().to_string();
            if self.columns.contains_key(&name) || columns.contains_key(&name) {
                return Err(DataError::DuplicateColumn(name));
            }
            columns.insert(name, column);
        }
        for (name, column) in &self.columns {
            columns.insert(name.clone(), column.clone());
        }

        Ok(Self::from_parts(columns, Index::range(self.nrows), self.nrows))
    }

    /// Rename columns
    pub fn rename_columns<S1, S2>(&self, mapping: &[(S1, S2)]) -> Result<Self>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let lookup: HashMap<&str, &str> = mapping
            .iter()
            .map(|(old, new)| (old.as_ref(), new.as_ref()))
            .collect();

        for old in lookup.keys() {
            if !self.columns.contains_key(*old) {
                return Err(self.column_not_found(old));
            }
        }

        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            let new_name = lookup.get(name.as_str()).copied().unwrap_or(name.as_str());
            if columns.contains_key(new_name) {
                return Err(DataError::DuplicateColumn(new_name.to_string()));
            }
            columns.insert(new_name.to_string(), column.clone().rename(new_name));
        }

        Ok(Self::from_parts(columns, self.index.clone(), self.nrows))
    }

    /// Relabel rows without changing row order
    pub fn rename_index(&self, mapping: &HashMap<Value, Value>) -> Self {
        let mut table = self.clone();
        table.index = self.index.rename(mapping);
        table
    }

    /// Return a Table with `column` added or replaced
    pub fn assign(&self, column: Column) -> Result<Self> {
        let mut table = self.clone();
        table.assign_in_place(column)?;
        Ok(table)
    }

    /// Add or replace a column in place.
    ///
    /// A new name is appended after the existing columns; an existing name
    /// keeps its position and only its values change. Changes `columns`,
    /// and `nrows`/`index` when the Table had no rows and no columns.
    pub fn assign_in_place(&mut self, column: Column) -> Result<()> {
        let adopt = self.columns.is_empty() && self.nrows == 0;
        if !adopt {
            check_length(
                &format!("assignment of column '{}'", column.name()),
                self.nrows,
                column.len(),
            )?;
        } else {
            self.nrows = column.len();
            self.index = Index::range(column.len());
        }

        self.columns.insert(column.name().to_string(), column);
        Ok(())
    }

    /// Return a Table without the named columns
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut table = self.clone();
        table.drop_columns_in_place(names)?;
        Ok(table)
    }

    /// Remove the named columns in place. Changes `columns` only.
    pub fn drop_columns_in_place<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if !self.columns.contains_key(name) {
                return Err(self.column_not_found(name));
            }
        }
        for name in names {
            self.columns.shift_remove(name.as_ref());
        }
        Ok(())
    }

    /// Return a Table without the rows carrying any of `labels`
    pub fn drop_rows(&self, labels: &[Value]) -> Result<Self> {
        let mut table = self.clone();
        table.drop_rows_in_place(labels)?;
        Ok(table)
    }

    /// Remove rows by label in place. Changes `index`, every column and `nrows`.
    pub fn drop_rows_in_place(&mut self, labels: &[Value]) -> Result<()> {
        let mut keep = vec![true; self.nrows];
        for label in labels {
            for pos in self.index.get_loc(label)? {
                keep[pos] = false;
            }
        }
        *self = self.filter_positions(&keep)?;
        Ok(())
    }

    /// Gather rows by position, keeping their labels
    pub fn take_rows(&self, positions: &[usize]) -> Result<Self> {
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            columns.insert(name.clone(), column.take(positions)?);
        }
        let index = self.index.take(positions)?;
        Ok(Self::from_parts(columns, index, positions.len()))
    }

    pub(crate) fn filter_positions(&self, keep: &[bool]) -> Result<Self> {
        check_length("row mask", self.nrows, keep.len())?;
        let positions: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter(|(_, k)| **k)
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&positions)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        self.iloc(0..n)
    }

    /// Last `n` rows
    pub fn tail(&self, n: usize) -> Self {
        let start = self.nrows.saturating_sub(n);
        self.iloc(start..self.nrows)
    }

    /// Boolean Table, true where a value is null
    pub fn isnull(&self) -> Self {
        self.map_columns(Column::isnull)
    }

    /// Boolean Table, true where a value is present
    pub fn notnull(&self) -> Self {
        self.map_columns(Column::notnull)
    }

    fn map_columns<F: Fn(&Column) -> Column>(&self, f: F) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), f(column)))
            .collect();
        Self::from_parts(columns, self.index.clone(), self.nrows)
    }

    /// Drop rows holding nulls in `subset` (all columns when `None`)
    pub fn dropna(&self, how: DropHow, subset: Option<&[&str]>) -> Result<Self> {
        let names: Vec<&str> = match subset {
            Some(names) => names.to_vec(),
            None => self.column_names(),
        };
        let columns: Vec<&Column> = names
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let keep: Vec<bool> = (0..self.nrows)
            .map(|row| {
                let mut nulls = columns.iter().map(|c| c.is_null(row));
                match how {
                    DropHow::Any => !nulls.any(|n| n),
                    DropHow::All => columns.is_empty() || !nulls.all(|n| n),
                }
            })
            .collect();

        self.filter_positions(&keep)
    }

    /// Fill nulls with a per-column value
    pub fn fillna(&self, values: &[(&str, Value)]) -> Result<Self> {
        let mut table = self.clone();
        table.fillna_in_place(values)?;
        Ok(table)
    }

    /// Fill nulls in place. Changes the named columns only.
    pub fn fillna_in_place(&mut self, values: &[(&str, Value)]) -> Result<()> {
        let mut filled = Vec::with_capacity(values.len());
        for (name, value) in values {
            filled.push(self.column(name)?.fillna(value.clone())?);
        }
        for column in filled {
            self.columns.insert(column.name().to_string(), column);
        }
        Ok(())
    }

    /// Return a Table with one row appended and a fresh range index.
    ///
    /// Columns missing from `row` receive nulls. Column types widen where
    /// needed (an Int column receiving a Float becomes Float).
    pub fn append_row(&self, row: &[(&str, Value)]) -> Result<Self> {
        let mut table = self.clone();
        table.append_row_in_place(row)?;
        Ok(table)
    }

    /// Append one row in place. Changes every column, `nrows`, and resets
    /// `index` to a range index.
    pub fn append_row_in_place(&mut self, row: &[(&str, Value)]) -> Result<()> {
        let provided: HashMap<&str, &Value> = row.iter().map(|(k, v)| (*k, v)).collect();
        for name in provided.keys() {
            if !self.columns.contains_key(*name) {
                return Err(self.column_not_found(name));
            }
        }

        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            let mut builder = ColumnBuilder::new(name.clone()).or_dtype(column.dtype());
            builder.reserve(self.nrows + 1);
            for value in column.iter() {
                builder.push(value)?;
            }
            builder.push(provided.get(name.as_str()).map_or(Value::Null, |v| (*v).clone()))?;
            columns.insert(name.clone(), builder.finish()?);
        }

        self.columns = columns;
        self.nrows += 1;
        self.index = Index::range(self.nrows);
        Ok(())
    }

    /// Reduce every column to one value (the `axis=0` form)
    pub fn reduce_columns(&self, func: AggFunc) -> Result<IndexMap<String, Value>> {
        self.columns
            .iter()
            .map(|(name, column)| Ok((name.clone(), column.aggregate(func)?)))
            .collect()
    }

    /// Reduce every row across the numeric columns (the `axis=1` form).
    ///
    /// The result is aligned with the Table's rows. Nulls are skipped.
    pub fn reduce_rows(&self, func: AggFunc, name: &str) -> Result<Column> {
        for column in self.columns.values() {
            if !column.dtype().is_numeric() {
                return Err(DataError::type_mismatch(
                    format!("row {} over column '{}'", func, column.name()),
                    "numeric",
                    column.dtype(),
                ));
            }
        }

        let mut builder = ColumnBuilder::new(name);
        builder.reserve(self.nrows);
        for row in 0..self.nrows {
            let cells: Vec<Value> = self
                .columns
                .values()
                .map(|column| column.get(row).unwrap_or_default())
                .collect();
            let row_column = Column::from_values(name, DType::Float, &cells)?;
            builder.push(row_column.aggregate(func)?)?;
        }
        builder.finish()
    }

    /// Summary statistics of the numeric columns, one row per statistic
    pub fn describe(&self) -> Result<Self> {
        const STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

        let mut builder = TableBuilder::new();
        for (name, column) in &self.columns {
            if !column.dtype().is_numeric() {
                continue;
            }
            let stats = column.describe()?;
            let values = vec![
                stats.count as f64,
                stats.mean,
                stats.std,
                stats.min,
                stats.q25,
                stats.q50,
                stats.q75,
                stats.max,
            ];
            builder = builder.with_column(Column::float(name.clone(), values))?;
        }

        let index = Index::from_values(STATS);
        builder.with_index(index).build()
    }

    /// Get a row view by position
    pub fn row(&self, pos: usize) -> Result<Row<'_>> {
        if pos >= self.nrows {
            return Err(DataError::IndexOutOfBounds {
                index: pos,
                len: self.nrows,
            });
        }

        Ok(Row { table: self, pos })
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> RowIter<'_> {
        RowIter {
            table: self,
            current: 0,
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// Which rows `dropna` removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropHow {
    /// Drop a row if any inspected value is null
    #[default]
    Any,
    /// Drop a row only if every inspected value is null
    All,
}

impl FromStr for DropHow {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(DropHow::Any),
            "all" => Ok(DropHow::All),
            _ => Err(DataError::UnsupportedConfig {
                option: "dropna mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Row view into a Table
pub struct Row<'a> {
    table: &'a Table,
    pos: usize,
}

impl<'a> Row<'a> {
    /// Row position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Row label
    pub fn label(&self) -> Value {
        self.table.index.get(self.pos).unwrap_or_default()
    }

    /// Get a value from the row
    pub fn get(&self, col: &str) -> Result<Value> {
        let column = self.table.column(col)?;
        Ok(column.get(self.pos).unwrap_or_default())
    }

    /// Get value as float
    pub fn get_f64(&self, col: &str) -> Result<Option<f64>> {
        Ok(self.get(col)?.as_f64())
    }

    /// Get value as string
    pub fn get_str(&self, col: &str) -> Result<Option<String>> {
        Ok(self.get(col)?.as_str().map(str::to_string))
    }

    /// All values in column order
    pub fn values(&self) -> Vec<Value> {
        self.table
            .columns
            .values()
            .map(|column| column.get(self.pos).unwrap_or_default())
            .collect()
    }
}

/// Iterator over rows
pub struct RowIter<'a> {
    table: &'a Table,
    current: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.table.nrows {
            let row = Row {
                table: self.table,
                pos: self.current,
            };
            self.current += 1;
            Some(row)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.nrows - self.current;
        (remaining, Some(remaining))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table({} rows × {} cols)", self.nrows, self.ncols())
    }
}
