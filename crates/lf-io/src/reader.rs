//! Reading delimited text into Tables

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use lf_core::data::{ColumnBuilder, TableBuilder};
use lf_core::{DType, DataError, Table};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};
use crate::infer::{infer_dtype, parse_column};

/// Options controlling how delimited text is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Field separator; may be longer than one character (e.g. `::`)
    pub delimiter: String,
    /// Whether the first record holds column names
    pub has_header: bool,
    /// Column names to use instead of the header
    pub names: Option<Vec<String>>,
    /// Cell contents read as null
    pub na_values: Vec<String>,
    /// Only keep these columns, in file order
    pub usecols: Option<Vec<String>>,
    /// Per-column types that bypass inference
    pub dtypes: HashMap<String, DType>,
    /// Rows inspected when inferring types; all rows when `None`
    pub infer_rows: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            has_header: true,
            names: None,
            na_values: vec![String::new()],
            usecols: None,
            dtypes: HashMap::new(),
            infer_rows: None,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Treat the first record as data and name the columns explicitly
    pub fn no_header<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.has_header = false;
        self.names = Some(names.iter().map(|n| n.as_ref().to_string()).collect());
        self
    }

    pub fn na_values<S: AsRef<str>>(mut self, tokens: &[S]) -> Self {
        self.na_values = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn usecols<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.usecols = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn dtype(mut self, column: impl Into<String>, dtype: DType) -> Self {
        self.dtypes.insert(column.into(), dtype);
        self
    }
}

/// Read a delimited text file
pub fn read_csv(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Table> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), delimiter = %options.delimiter, "reading delimited file");
    let file = File::open(path)?;
    read_from_reader(BufReader::new(file), options)
}

/// Read delimited text held in memory
pub fn read_str(text: &str, options: &ReadOptions) -> Result<Table> {
    read_from_reader(text.as_bytes(), options)
}

/// Read delimited text from any reader
pub fn read_from_reader<R: Read>(reader: R, options: &ReadOptions) -> Result<Table> {
    let mut records = match single_byte(&options.delimiter)? {
        Some(delimiter) => read_records(reader, delimiter)?,
        None => split_records(reader, &options.delimiter)?,
    };

    let header = if options.has_header && !records.is_empty() {
        Some(records.remove(0))
    } else {
        None
    };
    let width = header
        .as_ref()
        .or(records.first())
        .map_or_else(|| options.names.as_ref().map_or(0, Vec::len), Vec::len);

    let names = column_names(header, options, width)?;
    for (row, record) in records.iter().enumerate() {
        if record.len() != names.len() {
            return Err(DataError::Alignment {
                context: format!("fields of record {}", row),
                expected: names.len(),
                actual: record.len(),
            }
            .into());
        }
    }

    let selected = selected_columns(&names, options)?;
    let na: HashSet<&str> = options.na_values.iter().map(String::as_str).collect();

    let mut builder = TableBuilder::new();
    for pos in selected {
        let name = &names[pos];
        let cells: Vec<Option<&str>> = records
            .iter()
            .map(|record| {
                let cell = record[pos].as_str();
                (!na.contains(cell) && !na.contains(cell.trim())).then_some(cell)
            })
            .collect();

        let dtype = match options.dtypes.get(name) {
            Some(dtype) => *dtype,
            None => {
                let sample = cells.iter().flatten().copied();
                match options.infer_rows {
                    Some(n) => infer_dtype(sample.take(n)),
                    None => infer_dtype(sample),
                }
            }
        };
        tracing::trace!(column = %name, dtype = %dtype, "parsed column");

        let column = if records.is_empty() {
            ColumnBuilder::with_dtype(name.clone(), dtype).finish()?
        } else {
            parse_column(name, &cells, dtype)?
        };
        builder = builder.with_column(column)?;
    }

    let table = builder.build()?;
    tracing::debug!(rows = table.nrows(), columns = table.ncols(), "read table");
    Ok(table)
}

fn single_byte(delimiter: &str) -> Result<Option<u8>> {
    match delimiter.as_bytes() {
        [] => Err(IoError::Header("delimiter must not be empty".to_string())),
        [byte] => Ok(Some(*byte)),
        _ => Ok(None),
    }
}

fn read_records<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn split_records<R: Read>(mut reader: R, delimiter: &str) -> Result<Vec<Vec<String>>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect())
}

fn column_names(
    header: Option<Vec<String>>,
    options: &ReadOptions,
    width: usize,
) -> Result<Vec<String>> {
    let names = match (&options.names, header) {
        (Some(names), _) => names.clone(),
        (None, Some(header)) => header,
        (None, None) => (0..width).map(|i| i.to_string()).collect(),
    };

    if names.len() != width {
        return Err(IoError::Header(format!(
            "{} column names for {} fields",
            names.len(),
            width
        )));
    }

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(IoError::Header(format!("duplicate column name '{}'", name)));
        }
    }
    Ok(names)
}

fn selected_columns(names: &[String], options: &ReadOptions) -> Result<Vec<usize>> {
    let Some(usecols) = &options.usecols else {
        return Ok((0..names.len()).collect());
    };

    for wanted in usecols {
        if !names.contains(wanted) {
            return Err(IoError::Header(format!(
                "usecols column '{}' not found in {:?}",
                wanted, names
            )));
        }
    }
    Ok(names
        .iter()
        .enumerate()
        .filter(|(_, name)| usecols.contains(*name))
        .map(|(pos, _)| pos)
        .collect())
}
