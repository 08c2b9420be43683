//! Long to wide (pivot) and wide to long (melt) reshaping

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::*;

/// Options for [`Table::melt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltOptions {
    /// Columns repeated on every output row
    pub id_vars: Vec<String>,
    /// Columns unpivoted into rows; every non-id column when `None`
    pub value_vars: Option<Vec<String>>,
    pub var_name: String,
    pub value_name: String,
}

impl Default for MeltOptions {
    fn default() -> Self {
        Self {
            id_vars: Vec::new(),
            value_vars: None,
            var_name: "variable".to_string(),
            value_name: "value".to_string(),
        }
    }
}

impl MeltOptions {
    pub fn new<S: AsRef<str>>(id_vars: &[S]) -> Self {
        Self {
            id_vars: id_vars.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Table {
    /// Reshape to wide form without aggregation.
    ///
    /// Fails with `AmbiguousDuplicate` if a cell receives several values.
    pub fn pivot(&self, index: &str, columns: &str, values: &str) -> Result<Self> {
        self.pivot_table(index, columns, values, None)
    }

    /// Reshape to wide form: one row per distinct `index` value, one column
    /// per distinct `columns` value, cells taken from `values`.
    ///
    /// Rows and columns are sorted by key and rows with a null key are left
    /// out. Cells with no source row are null. A cell with several source
    /// rows is reduced with `aggfunc`; without one the pivot fails.
    pub fn pivot_table(
        &self,
        index: &str,
        columns: &str,
        values: &str,
        aggfunc: Option<AggFunc>,
    ) -> Result<Self> {
        let row_keys = self.column(index)?;
        let col_keys = self.column(columns)?;
        let cells_source = self.column(values)?;

        let mut rows = BTreeSet::new();
        let mut cols = BTreeSet::new();
        let mut cells: HashMap<(Value, Value), Vec<usize>> = HashMap::new();

        for pos in 0..self.nrows {
            let r = row_keys.get(pos).unwrap_or_default();
            let c = col_keys.get(pos).unwrap_or_default();
            if r.is_null() || c.is_null() {
                continue;
            }
            rows.insert(r.clone());
            cols.insert(c.clone());
            cells.entry((r, c)).or_default().push(pos);
        }

        let cell_type = match aggfunc {
            Some(func) => func.output_dtype(cells_source.dtype()),
            None => cells_source.dtype(),
        };

        let mut builder = TableBuilder::new();
        for c in &cols {
            let mut column = ColumnBuilder::new(c.to_string()).or_dtype(cell_type);
            column.reserve(rows.len());
            for r in &rows {
                let cell = match cells.get(&(r.clone(), c.clone())) {
                    None => Value::Null,
                    Some(positions) => match (aggfunc, positions.as_slice()) {
                        (None, [single]) => cells_source.get(*single).unwrap_or_default(),
                        (None, many) => {
                            return Err(DataError::AmbiguousDuplicate {
                                index: r.to_string(),
                                column: c.to_string(),
                                count: many.len(),
                            });
                        }
                        (Some(func), many) => cells_source.take(many)?.aggregate(func)?,
                    },
                };
                column.push(cell)?;
            }
            builder = builder.with_column(column.finish()?)?;
        }

        let labels: Vec<Value> = rows.into_iter().collect();
        let table = builder
            .with_index(Index::from_labels(labels).with_name(index))
            .build()?;

        tracing::debug!(
            index,
            columns,
            values,
            rows = table.nrows(),
            cols = table.ncols(),
            "pivoted table"
        );
        Ok(table)
    }

    /// Reshape to long form: one output row per (input row, value column).
    ///
    /// Rows are ordered by value column first, then by input row. The
    /// output has a fresh range index.
    pub fn melt(&self, options: &MeltOptions) -> Result<Self> {
        let value_vars: Vec<String> = match &options.value_vars {
            Some(vars) => vars.clone(),
            None => self
                .columns
                .keys()
                .filter(|name| !options.id_vars.contains(name))
                .cloned()
                .collect(),
        };
        let value_columns: Vec<&Column> = value_vars
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let positions: Vec<usize> = (0..value_columns.len())
            .flat_map(|_| 0..self.nrows)
            .collect();

        let mut builder = TableBuilder::new();
        for id in &options.id_vars {
            builder = builder.with_column(self.column(id)?.take(&positions)?)?;
        }

        let mut variable = Vec::with_capacity(positions.len());
        let value_type = value_columns
            .iter()
            .map(|c| c.dtype())
            .reduce(|a, b| a.unify(b).unwrap_or(a))
            .unwrap_or(DType::Float);
        let mut value = ColumnBuilder::new(options.value_name.clone()).or_dtype(value_type);
        value.reserve(positions.len());
        for column in &value_columns {
            for cell in column.iter() {
                variable.push(column.name().to_string());
                value.push(cell)?;
            }
        }

        let melted = builder
            .with_column(Column::string(options.var_name.clone(), variable))?
            .with_column(value.finish()?)?
            .build()?;

        tracing::debug!(
            id_vars = options.id_vars.len(),
            value_vars = value_columns.len(),
            rows = melted.nrows(),
            "melted table"
        );
        Ok(melted)
    }
}
