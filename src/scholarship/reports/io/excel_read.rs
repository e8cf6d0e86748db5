use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};
use tracing::debug;

use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::io::table::{Cell, Table, TableSource, excel_serial_to_date};

/// Reads one worksheet into a [`Table`]. Without a sheet name the first
/// worksheet of the workbook is used.
///
/// Accounting exports put a few title lines (company, report name, period)
/// above the column headings. The header row is the first row carrying at
/// least two non-blank cells; everything above it is discarded.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .ok_or_else(|| FundError::InvalidWorkbook(format!("missing sheet '{name}'")))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| FundError::InvalidWorkbook("workbook has no sheets".into()))?,
    }?;

    let mut rows = range.rows();
    let header = loop {
        match rows.next() {
            Some(row) if row.iter().filter(|cell| !cell.is_empty()).count() >= 2 => {
                break row
                    .iter()
                    .map(|cell| cell_to_string(Some(cell)))
                    .collect::<Vec<_>>();
            }
            Some(_) => continue,
            None => {
                return Err(FundError::InvalidWorkbook(format!(
                    "no header row found in {}",
                    path.display()
                )));
            }
        }
    };

    let mut table = Table::new(&header);
    for row in rows {
        table.push_row(row.iter().map(to_cell).collect());
    }

    debug!(
        path = %path.display(),
        columns = header.len(),
        rows = table.row_count() - 1,
        "worksheet loaded"
    );
    Ok(table)
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(value) => Cell::from(value.as_str()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::DateTime(serial) => {
            excel_serial_to_date(*serial).map_or(Cell::Number(*serial), Cell::Date)
        }
        other => Cell::from(cell_to_string(Some(other))),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.trim().to_string(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
