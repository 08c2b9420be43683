//! Delimited-text ingestion and text output for `lf_core` tables
//!
//! Type inference from text happens here; the core only ever receives
//! typed values.

mod error;
mod infer;
mod reader;
mod render;

#[cfg(test)]
mod tests;

pub use error::{IoError, Result};
pub use infer::{infer_dtype, parse_cell, parse_column};
pub use reader::{ReadOptions, read_csv, read_from_reader, read_str};
pub use render::{to_csv_string, to_text, write_csv, write_csv_path};
