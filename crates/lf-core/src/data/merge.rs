//! Relational joins between Tables
//!
//! Rows are matched on equal key values, nulls included. Every matching
//! pair produces an output row, so duplicate keys expand into their
//! Cartesian product.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::builder::dtype_name;
use super::*;

/// Join semantics for unmatched rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    /// Matching rows only
    #[default]
    Inner,
    /// Every left row; unmatched right cells are null
    Left,
    /// Every right row; unmatched left cells are null
    Right,
    /// Every row of both sides
    Outer,
}

impl FromStr for JoinType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "outer" | "full" => Ok(JoinType::Outer),
            _ => Err(DataError::UnsupportedConfig {
                option: "join type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Outer => "outer",
        };
        write!(f, "{}", name)
    }
}

/// Options for [`merge`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Key columns; the columns both Tables share when `None`
    pub on: Option<Vec<String>>,
    pub how: JoinType,
    /// Appended to non-key column names present on both sides
    pub suffixes: (String, String),
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            on: None,
            how: JoinType::Inner,
            suffixes: ("_x".to_string(), "_y".to_string()),
        }
    }
}

impl MergeOptions {
    /// Join on explicit key columns
    pub fn on<S: AsRef<str>>(keys: &[S]) -> Self {
        Self {
            on: Some(keys.iter().map(|k| k.as_ref().to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn how(mut self, how: JoinType) -> Self {
        self.how = how;
        self
    }

    pub fn suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = (left.into(), right.into());
        self
    }
}

impl Table {
    /// Join with `right`; see [`merge`]
    pub fn merge(&self, right: &Table, options: &MergeOptions) -> Result<Table> {
        merge(self, right, options)
    }
}

fn resolve_keys(left: &Table, right: &Table, options: &MergeOptions) -> Result<Vec<String>> {
    let keys: Vec<String> = match &options.on {
        Some(keys) => keys.clone(),
        None => left
            .columns
            .keys()
            .filter(|name| right.has_column(name))
            .cloned()
            .collect(),
    };

    if keys.is_empty() {
        return Err(DataError::MergeKeyNotFound {
            key: "<no common columns>".to_string(),
            side: "either",
        });
    }

    for key in &keys {
        let left_type = match left.columns.get(key) {
            Some(column) => column.dtype(),
            None => {
                return Err(DataError::MergeKeyNotFound {
                    key: key.clone(),
                    side: "left",
                });
            }
        };
        let right_type = match right.columns.get(key) {
            Some(column) => column.dtype(),
            None => {
                return Err(DataError::MergeKeyNotFound {
                    key: key.clone(),
                    side: "right",
                });
            }
        };
        if left_type.unify(right_type).is_none() {
            return Err(DataError::type_mismatch(
                format!("merge key '{}'", key),
                dtype_name(left_type),
                right_type,
            ));
        }
    }
    Ok(keys)
}

fn row_keys(table: &Table, keys: &[String]) -> Result<Vec<Value>> {
    let columns: Vec<&Column> = keys
        .iter()
        .map(|k| table.column(k))
        .collect::<Result<_>>()?;

    Ok((0..table.nrows)
        .map(|row| {
            let mut parts: Vec<Value> = columns
                .iter()
                .map(|c| c.get(row).unwrap_or_default().bool_as_int())
                .collect();
            if parts.len() == 1 {
                parts.pop().unwrap_or_default()
            } else {
                Value::Tuple(parts)
            }
        })
        .collect())
}

fn positions_by_key(keys: &[Value]) -> HashMap<&Value, Vec<usize>> {
    let mut map: HashMap<&Value, Vec<usize>> = HashMap::with_capacity(keys.len());
    for (pos, key) in keys.iter().enumerate() {
        map.entry(key).or_default().push(pos);
    }
    map
}

type RowPair = (Option<usize>, Option<usize>);

fn pair_rows(left_keys: &[Value], right_keys: &[Value], how: JoinType) -> Vec<RowPair> {
    let mut pairs = Vec::new();

    if how == JoinType::Right {
        let left_map = positions_by_key(left_keys);
        for (r, key) in right_keys.iter().enumerate() {
            match left_map.get(key) {
                Some(matches) => pairs.extend(matches.iter().map(|&l| (Some(l), Some(r)))),
                None => pairs.push((None, Some(r))),
            }
        }
        return pairs;
    }

    let right_map = positions_by_key(right_keys);
    let mut matched = vec![false; right_keys.len()];
    for (l, key) in left_keys.iter().enumerate() {
        match right_map.get(key) {
            Some(matches) => {
                for &r in matches {
                    matched[r] = true;
                    pairs.push((Some(l), Some(r)));
                }
            }
            None if how != JoinType::Inner => pairs.push((Some(l), None)),
            None => {}
        }
    }

    if how == JoinType::Outer {
        pairs.extend(
            matched
                .iter()
                .enumerate()
                .filter(|(_, m)| !**m)
                .map(|(r, _)| (None, Some(r))),
        );
    }
    pairs
}

/// Join two Tables on equal key values.
///
/// Output columns are the left columns with keys in place, followed by the
/// right non-key columns. Key cells come from whichever side matched.
/// Row order follows the left Table (the right Table for right joins);
/// outer joins append unmatched right rows. The result has a fresh range
/// index.
pub fn merge(left: &Table, right: &Table, options: &MergeOptions) -> Result<Table> {
    let keys = resolve_keys(left, right, options)?;
    let left_keys = row_keys(left, &keys)?;
    let right_keys = row_keys(right, &keys)?;
    let pairs = pair_rows(&left_keys, &right_keys, options.how);

    let left_rows: Vec<Option<usize>> = pairs.iter().map(|(l, _)| *l).collect();
    let right_rows: Vec<Option<usize>> = pairs.iter().map(|(_, r)| *r).collect();
    let is_key = |name: &str| keys.iter().any(|k| k == name);
    let (left_suffix, right_suffix) = &options.suffixes;

    let mut builder = TableBuilder::new();
    for column in left.columns.values() {
        let name = column.name();
        let merged = if is_key(name) {
            let other = right.column(name)?;
            let key_type = column.dtype().unify(other.dtype()).unwrap_or(column.dtype());
            let mut key = ColumnBuilder::with_dtype(name, key_type);
            key.reserve(pairs.len());
            for (l, r) in &pairs {
                let cell = match (l, r) {
                    (Some(l), _) => column.get(*l),
                    (None, Some(r)) => other.get(*r),
                    (None, None) => None,
                };
                key.push(cell.unwrap_or_default())?;
            }
            key.finish()?
        } else {
            let taken = column.take_opt(&left_rows)?;
            if right.has_column(name) {
                taken.rename(format!("{}{}", name, left_suffix))
            } else {
                taken
            }
        };
        builder = builder.with_column(merged)?;
    }

    for column in right.columns.values() {
        let name = column.name();
        if is_key(name) {
            continue;
        }
        let taken = column.take_opt(&right_rows)?;
        let taken = if left.has_column(name) {
            taken.rename(format!("{}{}", name, right_suffix))
        } else {
            taken
        };
        builder = builder.with_column(taken)?;
    }

    let merged = builder.with_index(Index::range(pairs.len())).build()?;

    tracing::debug!(
        how = %options.how,
        keys = ?keys,
        left_rows = left.nrows(),
        right_rows = right.nrows(),
        rows = merged.nrows(),
        "merged tables"
    );
    Ok(merged)
}
