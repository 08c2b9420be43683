//! Text rendering and CSV export of Tables

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lf_core::{Table, Value};

use crate::error::Result;

fn cell(value: &Value) -> String {
    value.to_string()
}

fn csv_cell(value: &Value) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Row positions shown for a limit; `None` marks the elided gap
fn visible_rows(nrows: usize, max_rows: Option<usize>) -> Vec<Option<usize>> {
    match max_rows {
        Some(max) if nrows > max => {
            let head = max.div_ceil(2);
            let tail = max / 2;
            (0..head)
                .map(Some)
                .chain(std::iter::once(None))
                .chain((nrows - tail..nrows).map(Some))
                .collect()
        }
        _ => (0..nrows).map(Some).collect(),
    }
}

/// Render a Table as aligned plain text.
///
/// The index is the first column. With `max_rows`, only the first and last
/// rows are shown around a `...` line, followed by the full shape.
pub fn to_text(table: &Table, max_rows: Option<usize>) -> String {
    let rows = visible_rows(table.nrows(), max_rows);
    let columns: Vec<_> = table.columns().collect();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    let mut header = vec![table.index().names().join(", ")];
    header.extend(columns.iter().map(|c| c.name().to_string()));
    grid.push(header);

    for row in &rows {
        let line = match row {
            Some(pos) => {
                let mut line = vec![cell(&table.index().get(*pos).unwrap_or_default())];
                line.extend(
                    columns
                        .iter()
                        .map(|c| cell(&c.get(*pos).unwrap_or_default())),
                );
                line
            }
            None => vec!["...".to_string(); columns.len() + 1],
        };
        grid.push(line);
    }

    let widths: Vec<usize> = (0..=columns.len())
        .map(|col| {
            grid.iter()
                .map(|line| line[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in &grid {
        let rendered: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (text, width))| {
                if i == 0 {
                    format!("{:<width$}", text, width = width)
                } else {
                    format!("{:>width$}", text, width = width)
                }
            })
            .collect();
        out.push_str(rendered.join("  ").trim_end());
        out.push('\n');
    }

    if rows.contains(&None) {
        out.push_str(&format!(
            "\n[{} rows x {} columns]\n",
            table.nrows(),
            table.ncols()
        ));
    }
    out
}

/// Write a Table as CSV; nulls become empty fields
pub fn write_csv<W: Write>(table: &Table, writer: W, include_index: bool) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = Vec::with_capacity(table.ncols() + 1);
    if include_index {
        header.push(table.index().names().join("_"));
    }
    header.extend(table.column_names().into_iter().map(str::to_string));
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        if include_index {
            record.push(csv_cell(&row.label()));
        }
        record.extend(row.values().iter().map(csv_cell));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    tracing::debug!(rows = table.nrows(), columns = table.ncols(), "wrote csv");
    Ok(())
}

/// Write a Table to a CSV file
pub fn write_csv_path(table: &Table, path: impl AsRef<Path>, include_index: bool) -> Result<()> {
    let file = File::create(path)?;
    write_csv(table, file, include_index)
}

/// Render a Table as a CSV string
pub fn to_csv_string(table: &Table, include_index: bool) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer, include_index)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
