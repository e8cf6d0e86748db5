use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, FundError>;

/// Error type covering the different failure cases that can occur while the
/// reports ingest spreadsheets, aggregate them, or write their output.
#[derive(Debug, Error)]
pub enum FundError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the configuration file cannot be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Raised when the configuration parses but describes an impossible setup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when a workbook does not contain the expected sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a required column heading is absent from the header row.
    #[error("missing column heading '{column}'")]
    MissingColumn { column: String },

    /// Raised when a cell cannot be interpreted as a date.
    #[error("invalid date '{value}' in column {column}, row {row}")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },

    /// Raised when a cell cannot be interpreted as a monetary amount.
    #[error("invalid amount '{value}' in column {column}, row {row}")]
    InvalidDecimal {
        row: usize,
        column: String,
        value: String,
    },

    /// Raised when a donor, recipient or award group lookup misses.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Raised when the aggregation reaches a state its own rules forbid.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the output path has an extension no writer handles.
    #[error("unsupported output format: {0}")]
    UnsupportedOutput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl FundError {
    /// Builds a lookup miss for the given entity kind.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        FundError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// True when the error signals broken classification logic rather than
    /// malformed input. Such errors must abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FundError::Invariant(_))
    }
}
