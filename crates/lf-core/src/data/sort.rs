//! Sorting of Columns and Tables
//!
//! All sorts are stable: rows with equal keys keep their relative order.
//! Nulls sort last in both directions.

use std::cmp::Ordering;

use super::*;

/// Compare two values with nulls placed after every non-null value
pub(crate) fn cmp_nulls_last(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            if let (Value::Tuple(a), Value::Tuple(b)) = (a, b) {
                // nulls last within every level, not only for whole keys
                for (x, y) in a.iter().zip(b) {
                    let cmp = cmp_nulls_last(x, y, ascending);
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                let cmp = a.len().cmp(&b.len());
                return if ascending { cmp } else { cmp.reverse() };
            }
            let cmp = a.cmp(b);
            if ascending { cmp } else { cmp.reverse() }
        }
    }
}

impl Column {
    /// Positions that would sort the column
    pub fn argsort(&self, ascending: bool) -> Vec<usize> {
        let values = self.to_values();
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| cmp_nulls_last(&values[a], &values[b], ascending));
        order
    }

    /// Sorted copy of the column
    pub fn sort_values(&self, ascending: bool) -> Result<Column> {
        self.take(&self.argsort(ascending))
    }
}

impl Table {
    /// Sort rows by one column, carrying labels along
    pub fn sort_values(&self, by: &str, ascending: bool) -> Result<Self> {
        self.sort_by(&[(by, ascending)])
    }

    /// Sort rows by one column in place. Changes row order of every column
    /// and of the index.
    pub fn sort_values_in_place(&mut self, by: &str, ascending: bool) -> Result<()> {
        *self = self.sort_values(by, ascending)?;
        Ok(())
    }

    /// Sort rows by several `(column, ascending)` keys, most significant first
    pub fn sort_by(&self, keys: &[(&str, bool)]) -> Result<Self> {
        if keys.is_empty() {
            return Ok(self.clone());
        }

        let columns: Vec<(Vec<Value>, bool)> = keys
            .iter()
            .map(|(name, ascending)| Ok((self.column(name)?.to_values(), *ascending)))
            .collect::<Result<_>>()?;

        let mut order: Vec<usize> = (0..self.nrows).collect();
        order.sort_by(|&a, &b| {
            for (values, ascending) in &columns {
                let cmp = cmp_nulls_last(&values[a], &values[b], *ascending);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        tracing::trace!(keys = keys.len(), rows = self.nrows, "sorted table");
        self.take_rows(&order)
    }

    /// Sort rows by their labels
    pub fn sort_index(&self, ascending: bool) -> Result<Self> {
        self.take_rows(&self.index.argsort(ascending))
    }

    /// Sort rows by their labels in place. Changes row order of every column
    /// and of the index.
    pub fn sort_index_in_place(&mut self, ascending: bool) -> Result<()> {
        *self = self.sort_index(ascending)?;
        Ok(())
    }
}
