use lf_core::DataError;

/// Errors raised while reading or writing delimited text
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Cannot parse '{value}' as {expected} in column '{column}', row {row}")]
    Parse {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("Header error: {0}")]
    Header(String),
}

pub type Result<T> = std::result::Result<T, IoError>;
