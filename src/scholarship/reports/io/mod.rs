pub mod columns;
pub mod excel_read;
pub mod excel_write;
pub mod json_write;
pub mod table;

use std::path::Path;

use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::flatten::WorkbookData;

/// Output formats the reports can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Excel,
    Json,
}

/// Attempts to infer the output format from the file extension.
pub fn detect_format(path: &Path) -> Option<OutputFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "xlsx" => Some(OutputFormat::Excel),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

/// Writes the workbook in the format implied by the output path.
pub fn write_report(path: &Path, workbook: &WorkbookData) -> Result<()> {
    match detect_format(path) {
        Some(OutputFormat::Excel) => excel_write::write_workbook(path, workbook),
        Some(OutputFormat::Json) => json_write::write_json(path, workbook),
        None => Err(FundError::UnsupportedOutput(path.to_path_buf())),
    }
}
