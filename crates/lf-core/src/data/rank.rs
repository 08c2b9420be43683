//! Ranking with tie-break policies

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::*;

/// How equal values share ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMethod {
    /// Mean of the ordinals of the tied values
    #[default]
    Average,
    /// Lowest ordinal among the ties
    Min,
    /// Highest ordinal among the ties
    Max,
    /// Ordinals in order of appearance
    First,
    /// Like `Min`, but the next distinct value follows without a gap
    Dense,
}

impl FromStr for RankMethod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(RankMethod::Average),
            "min" => Ok(RankMethod::Min),
            "max" => Ok(RankMethod::Max),
            "first" => Ok(RankMethod::First),
            "dense" => Ok(RankMethod::Dense),
            _ => Err(DataError::UnsupportedConfig {
                option: "rank method",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RankMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankMethod::Average => "average",
            RankMethod::Min => "min",
            RankMethod::Max => "max",
            RankMethod::First => "first",
            RankMethod::Dense => "dense",
        };
        write!(f, "{}", name)
    }
}

/// Options for ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    pub method: RankMethod,
    pub ascending: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            method: RankMethod::Average,
            ascending: true,
        }
    }
}

impl RankOptions {
    pub fn new(method: RankMethod, ascending: bool) -> Self {
        Self { method, ascending }
    }
}

impl Column {
    /// Rank of every value as a Float column; nulls stay null
    pub fn rank(&self, options: &RankOptions) -> Result<Column> {
        let mut entries: Vec<(usize, Value)> = self
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .collect();

        entries.sort_by(|(_, a), (_, b)| {
            let cmp = a.cmp(b);
            if options.ascending { cmp } else { cmp.reverse() }
        });

        let mut ranks = vec![f64::NAN; self.len()];
        let mut dense = 0.0;
        let mut start = 0;
        while start < entries.len() {
            let mut end = start + 1;
            while end < entries.len() && entries[end].1.cmp(&entries[start].1) == Ordering::Equal {
                end += 1;
            }
            dense += 1.0;

            for (offset, (pos, _)) in entries[start..end].iter().enumerate() {
                ranks[*pos] = match options.method {
                    RankMethod::Average => (start + 1 + end) as f64 / 2.0,
                    RankMethod::Min => (start + 1) as f64,
                    RankMethod::Max => end as f64,
                    RankMethod::First => (start + offset + 1) as f64,
                    RankMethod::Dense => dense,
                };
            }
            start = end;
        }

        Ok(Column::float(self.name().to_string(), ranks))
    }
}

impl Table {
    /// Rank every numeric column; other columns are left out
    pub fn rank(&self, options: &RankOptions) -> Result<Self> {
        let mut builder = TableBuilder::new().with_index(self.index.clone());
        for column in self.columns.values() {
            if column.dtype().is_numeric() {
                builder = builder.with_column(column.rank(options)?)?;
            }
        }
        builder.build()
    }
}
