//! Index structures for Tables
//!
//! An Index maps row labels to row positions. Positional access and
//! label-based access are separate operations so integer labels are never
//! mistaken for positions.

use std::collections::HashMap;
use std::ops::Range;

use super::sort::cmp_nulls_last;
use super::*;

/// Default index labelling rows `start, start + step, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeIndex {
    start: i64,
    step: i64,
    len: usize,
    name: Option<String>,
}

impl RangeIndex {
    /// Create a new range index
    pub fn new(start: i64, step: i64, len: usize) -> Result<Self> {
        if step == 0 {
            return Err(DataError::InvalidParameter(
                "range index step must be non-zero".to_string(),
            ));
        }
        let index = Self {
            start,
            step,
            len,
            name: None,
        };
        if let Some(last) = len.checked_sub(1) {
            if index.label_at(last).is_none() {
                return Err(DataError::IndexOutOfBounds { index: last, len });
            }
        }
        Ok(index)
    }

    /// Create a range index from 0 to n
    pub fn from_len(n: usize) -> Self {
        Self {
            start: 0,
            step: 1,
            len: n,
            name: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn label_at(&self, pos: usize) -> Option<i64> {
        i64::try_from(pos)
            .ok()?
            .checked_mul(self.step)?
            .checked_add(self.start)
    }

    fn get(&self, pos: usize) -> Option<Value> {
        if pos >= self.len {
            return None;
        }
        self.label_at(pos).map(Value::Int)
    }

    fn position_of(&self, label: &Value) -> Option<usize> {
        let label = label.as_i64().filter(|_| !matches!(label, Value::Bool(_)))?;
        let offset = label.checked_sub(self.start)?;
        if offset.checked_rem(self.step)? != 0 {
            return None;
        }
        let pos = offset.checked_div(self.step)?;
        (pos >= 0 && (pos as usize) < self.len).then_some(pos as usize)
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            // an empty slice may start one past the last label
            start: self.label_at(range.start).unwrap_or(self.start),
            step: self.step,
            len: range.end - range.start,
            name: self.name.clone(),
        }
    }
}

/// Index holding an explicit label per row
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: Vec<Value>,
    names: Vec<String>,
    positions: HashMap<Value, Vec<usize>>,
}

impl LabelIndex {
    /// Create a new label index from values
    pub fn new(labels: Vec<Value>) -> Self {
        let mut positions: HashMap<Value, Vec<usize>> = HashMap::with_capacity(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            positions.entry(label.clone()).or_default().push(pos);
        }
        Self {
            labels,
            names: Vec::new(),
            positions,
        }
    }

    /// Labels in row order
    pub fn labels(&self) -> &[Value] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn positions_of(&self, label: &Value) -> Option<&[usize]> {
        self.positions.get(label).map(Vec::as_slice)
    }
}

impl PartialEq for LabelIndex {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels && self.names == other.names
    }
}

/// Enum for different index types
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    Range(RangeIndex),
    Labels(LabelIndex),
}

impl Index {
    /// Create a `0..n` range index
    pub fn range(n: usize) -> Self {
        Self::Range(RangeIndex::from_len(n))
    }

    /// Create a label index
    pub fn from_labels(labels: Vec<Value>) -> Self {
        Self::Labels(LabelIndex::new(labels))
    }

    /// Create a label index from anything convertible to values
    pub fn from_values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::from_labels(values.into_iter().map(Into::into).collect())
    }

    /// Get the length of the index
    pub fn len(&self) -> usize {
        match self {
            Index::Range(idx) => idx.len(),
            Index::Labels(idx) => idx.len(),
        }
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is a default range index
    pub fn is_range(&self) -> bool {
        matches!(self, Index::Range(_))
    }

    /// Label at a row position
    pub fn get(&self, pos: usize) -> Option<Value> {
        match self {
            Index::Range(idx) => idx.get(pos),
            Index::Labels(idx) => idx.labels.get(pos).cloned(),
        }
    }

    /// Iterate over labels in row order
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(|pos| self.get(pos))
    }

    /// All labels in row order
    pub fn labels(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Level names; empty for an unnamed index
    pub fn names(&self) -> Vec<&str> {
        match self {
            Index::Range(idx) => idx.name.iter().map(String::as_str).collect(),
            Index::Labels(idx) => idx.names.iter().map(String::as_str).collect(),
        }
    }

    /// Name of a single-level index
    pub fn name(&self) -> Option<&str> {
        self.names().first().copied()
    }

    /// Return the index with a single level name
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_names(vec![name.into()])
    }

    /// Return the index with per-level names
    pub fn with_names(self, names: Vec<String>) -> Self {
        match self {
            Index::Range(mut idx) => {
                idx.name = names.into_iter().next();
                Index::Range(idx)
            }
            Index::Labels(mut idx) => {
                idx.names = names;
                Index::Labels(idx)
            }
        }
    }

    fn names_owned(&self) -> Vec<String> {
        self.names().into_iter().map(str::to_string).collect()
    }

    /// Whether every label occurs once
    pub fn is_unique(&self) -> bool {
        match self {
            Index::Range(_) => true,
            Index::Labels(idx) => idx.positions.len() == idx.labels.len(),
        }
    }

    /// Whether the label occurs in the index
    pub fn contains(&self, label: &Value) -> bool {
        match self {
            Index::Range(idx) => idx.position_of(label).is_some(),
            Index::Labels(idx) => idx.positions.contains_key(label),
        }
    }

    /// All row positions carrying `label`, in row order
    pub fn get_loc(&self, label: &Value) -> Result<Vec<usize>> {
        let found = match self {
            Index::Range(idx) => idx.position_of(label).map(|pos| vec![pos]),
            Index::Labels(idx) => idx.positions_of(label).map(<[usize]>::to_vec),
        };
        found.ok_or_else(|| DataError::LabelNotFound {
            label: label.to_string(),
        })
    }

    /// First row position carrying `label`
    pub fn first_position(&self, label: &Value) -> Result<usize> {
        let found = match self {
            Index::Range(idx) => idx.position_of(label),
            Index::Labels(idx) => idx.positions_of(label).and_then(|p| p.first().copied()),
        };
        found.ok_or_else(|| DataError::LabelNotFound {
            label: label.to_string(),
        })
    }

    /// Positional half-open slice; bounds past the end are clamped
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        match self {
            Index::Range(idx) => Index::Range(idx.slice(start..end)),
            Index::Labels(idx) => {
                let sliced = Index::from_labels(idx.labels[start..end].to_vec());
                sliced.with_names(idx.names.clone())
            }
        }
    }

    /// Resolve an inclusive label range to a positional range.
    ///
    /// Each bound resolves to the first position of its label. Every row
    /// between the two positions is included, whatever its own label. A
    /// range whose end precedes its start is empty.
    pub fn label_range(&self, start: &Value, end: &Value) -> Result<Range<usize>> {
        let from = self.first_position(start)?;
        let to = self.first_position(end)?;
        if to < from {
            return Ok(from..from);
        }
        Ok(from..to + 1)
    }

    /// Gather labels by position
    pub fn take(&self, positions: &[usize]) -> Result<Self> {
        let len = self.len();
        let mut labels = Vec::with_capacity(positions.len());
        for &pos in positions {
            labels.push(
                self.get(pos)
                    .ok_or(DataError::IndexOutOfBounds { index: pos, len })?,
            );
        }
        Ok(Index::from_labels(labels).with_names(self.names_owned()))
    }

    /// Relabel rows without changing their order; unmapped labels are kept
    pub fn rename(&self, mapping: &HashMap<Value, Value>) -> Self {
        let labels = self
            .iter()
            .map(|label| mapping.get(&label).cloned().unwrap_or(label))
            .collect();
        Index::from_labels(labels).with_names(self.names_owned())
    }

    /// Index with one more label at the end
    pub fn append(&self, label: Value) -> Self {
        let mut labels = self.labels();
        labels.push(label);
        Index::from_labels(labels).with_names(self.names_owned())
    }

    /// Stable ordering of positions by label; null labels sort last
    pub fn argsort(&self, ascending: bool) -> Vec<usize> {
        let labels = self.labels();
        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| cmp_nulls_last(&labels[a], &labels[b], ascending));
        order
    }
}

impl Default for Index {
    fn default() -> Self {
        Index::range(0)
    }
}
