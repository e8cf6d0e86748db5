use std::fs;
use std::path::Path;

use crate::scholarship::reports::error::Result;
use crate::scholarship::reports::flatten::WorkbookData;

/// Writes the report tables as a pretty-printed JSON document.
pub fn write_json(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let json_string = serde_json::to_string_pretty(workbook)?;
    fs::write(path, json_string)?;
    Ok(())
}
