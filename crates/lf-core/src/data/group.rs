//! Grouping rows by key columns and reducing each group
//!
//! Groups are kept in order of first appearance of their key unless
//! [`GroupOptions::sort`] is set. A single key labels each group with the
//! key value; several keys label it with a `Value::Tuple`. Per-group
//! reductions run on the rayon pool and are collected in group order.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::sort::cmp_nulls_last;
use super::*;

/// Options for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    /// Leave out rows whose key holds a null
    pub dropna: bool,
    /// Order groups by key instead of first appearance
    pub sort: bool,
}

/// Rows of a Table partitioned by key
#[derive(Debug, Clone)]
pub struct GroupBy<'a> {
    table: &'a Table,
    keys: Vec<String>,
    groups: IndexMap<Value, Vec<usize>>,
    selection: Option<Vec<String>>,
}

impl Table {
    /// Group rows by one or more key columns with default options
    pub fn groupby(&self, keys: &[&str]) -> Result<GroupBy<'_>> {
        self.groupby_with(keys, GroupOptions::default())
    }

    /// Group rows by one or more key columns
    pub fn groupby_with(&self, keys: &[&str], options: GroupOptions) -> Result<GroupBy<'_>> {
        if keys.is_empty() {
            return Err(DataError::InvalidParameter(
                "groupby needs at least one key column".to_string(),
            ));
        }
        let key_columns: Vec<&Column> = keys
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let mut groups: IndexMap<Value, Vec<usize>> = IndexMap::new();
        for row in 0..self.nrows {
            let parts: Vec<Value> = key_columns
                .iter()
                .map(|c| c.get(row).unwrap_or_default())
                .collect();
            if options.dropna && parts.iter().any(Value::is_null) {
                continue;
            }
            let key = if parts.len() == 1 {
                parts.into_iter().next().unwrap_or_default()
            } else {
                Value::Tuple(parts)
            };
            groups.entry(key).or_default().push(row);
        }

        if options.sort {
            groups.sort_by(|a, _, b, _| cmp_nulls_last(a, b, true));
        }

        tracing::debug!(
            keys = ?keys,
            rows = self.nrows,
            groups = groups.len(),
            "grouped table"
        );

        Ok(GroupBy {
            table: self,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            groups,
            selection: None,
        })
    }
}

impl<'a> GroupBy<'a> {
    /// Number of groups
    pub fn ngroups(&self) -> usize {
        self.groups.len()
    }

    /// Group labels in output order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.groups.keys()
    }

    /// Row positions of every group in output order
    pub fn indices(&self) -> &IndexMap<Value, Vec<usize>> {
        &self.groups
    }

    /// Rows of one group, with their original labels
    pub fn get_group(&self, key: &Value) -> Result<Table> {
        let positions = self
            .groups
            .get(key)
            .ok_or_else(|| DataError::LabelNotFound {
                label: key.to_string(),
            })?;
        self.table.take_rows(positions)
    }

    /// Iterate over `(label, rows)` pairs in output order
    pub fn iter(&self) -> impl Iterator<Item = Result<(&Value, Table)>> + '_ {
        self.groups
            .iter()
            .map(|(key, positions)| Ok((key, self.table.take_rows(positions)?)))
    }

    /// Restrict the aggregated columns
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        for name in columns {
            names.push(self.table.column(name.as_ref())?.name().to_string());
        }
        Ok(Self {
            selection: Some(names),
            ..self.clone()
        })
    }

    /// Number of rows per group, as a single `size` column
    pub fn size(&self) -> Result<Table> {
        let sizes: Vec<i64> = self.groups.values().map(|p| p.len() as i64).collect();
        TableBuilder::new()
            .with_column(Column::int("size", sizes))?
            .with_index(self.output_index())
            .build()
    }

    /// Reduce every value column with a named function
    pub fn agg(&self, func: AggFunc) -> Result<Table> {
        self.apply(&func)
    }

    /// Reduce each listed column with its own function
    pub fn agg_columns(&self, aggregations: &[(&str, AggFunc)]) -> Result<Table> {
        let plan: Vec<(&Column, &dyn Reducer)> = aggregations
            .iter()
            .map(|(name, func)| Ok((self.table.column(name)?, func as &dyn Reducer)))
            .collect::<Result<_>>()?;
        self.reduce(&plan)
    }

    /// Reduce every value column with a custom reducer
    pub fn apply<R: Reducer>(&self, reducer: &R) -> Result<Table> {
        let plan: Vec<(&Column, &dyn Reducer)> = self
            .value_columns()?
            .into_iter()
            .map(|column| (column, reducer as &dyn Reducer))
            .collect();
        self.reduce(&plan)
    }

    fn value_columns(&self) -> Result<Vec<&'a Column>> {
        match &self.selection {
            Some(names) => names.iter().map(|n| self.table.column(n)).collect(),
            None => Ok(self
                .table
                .columns
                .values()
                .filter(|c| !self.keys.iter().any(|k| k == c.name()))
                .collect()),
        }
    }

    fn reduce(&self, plan: &[(&Column, &dyn Reducer)]) -> Result<Table> {
        let groups: Vec<&Vec<usize>> = self.groups.values().collect();
        let mut builder = TableBuilder::new().with_index(self.output_index());

        for (column, reducer) in plan {
            tracing::trace!(
                column = column.name(),
                reducer = reducer.name(),
                groups = groups.len(),
                "reducing groups"
            );
            let values: Vec<Value> = groups
                .par_iter()
                .map(|positions| reducer.reduce(&column.take(positions)?))
                .collect::<Result<_>>()?;

            let fallback = reducer.output_dtype(column.dtype()).unwrap_or(column.dtype());
            let mut out = ColumnBuilder::new(column.name()).or_dtype(fallback);
            out.reserve(values.len());
            for value in values {
                out.push(value)?;
            }
            builder = builder.with_column(out.finish()?)?;
        }

        builder.build()
    }

    fn output_index(&self) -> Index {
        let labels: Vec<Value> = self.groups.keys().cloned().collect();
        Index::from_labels(labels).with_names(self.keys.clone())
    }
}
