//! Column type inference and parsing of text cells

use chrono::{NaiveDate, NaiveDateTime};
use lf_core::{Column, DType, Value};

use crate::error::{IoError, Result};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse one non-null cell as `dtype`
pub fn parse_cell(raw: &str, dtype: DType) -> Option<Value> {
    let trimmed = raw.trim();
    match dtype {
        DType::Int => trimmed.parse::<i64>().ok().map(Value::Int),
        DType::Float => trimmed.parse::<f64>().ok().map(Value::Float),
        DType::Bool => parse_bool(trimmed).map(Value::Bool),
        DType::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
        DType::Str => Some(Value::Str(raw.to_string())),
    }
}

/// Narrowest type every cell parses as.
///
/// Candidates are tried as integer, float, boolean, timestamp, then string.
/// A column without any non-null cell is float.
pub fn infer_dtype<'a, I>(cells: I) -> DType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidates = vec![DType::Int, DType::Float, DType::Bool, DType::Timestamp];
    let mut seen = false;

    for cell in cells {
        seen = true;
        candidates.retain(|dtype| parse_cell(cell, *dtype).is_some());
        if candidates.is_empty() {
            return DType::Str;
        }
    }

    if !seen {
        return DType::Float;
    }
    candidates.first().copied().unwrap_or(DType::Str)
}

fn expected_name(dtype: DType) -> &'static str {
    match dtype {
        DType::Int => "integer",
        DType::Float => "float",
        DType::Bool => "boolean",
        DType::Str => "string",
        DType::Timestamp => "timestamp",
    }
}

/// Build a typed column from text cells; `None` cells are null
pub fn parse_column(name: &str, cells: &[Option<&str>], dtype: DType) -> Result<Column> {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        let value = match cell {
            None => Value::Null,
            Some(raw) => parse_cell(raw, dtype).ok_or_else(|| IoError::Parse {
                column: name.to_string(),
                row,
                value: raw.to_string(),
                expected: expected_name(dtype),
            })?,
        };
        values.push(value);
    }
    Ok(Column::from_values(name, dtype, &values)?)
}
