use std::path::Path;

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ExcelDateTime, Format, TableColumn, Workbook};

use crate::scholarship::reports::error::Result;
use crate::scholarship::reports::flatten::{ReportCell, WorkbookData};

const MONEY_FORMAT: &str = "#,##0.00";
const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Writes the provided workbook data to the given path.
///
/// The workbook is assembled in memory and saved in one step, so a failure
/// part way through never leaves a truncated file behind.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let money = Format::new().set_num_format(MONEY_FORMAT);
    let date = Format::new().set_num_format(DATE_FORMAT);
    let bold = Format::new().set_bold();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &bold)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = col_idx as u16;
                match cell {
                    ReportCell::Empty => {}
                    ReportCell::Text(value) => {
                        worksheet.write_string(row_num, col_num, value)?;
                    }
                    ReportCell::Integer(value) => {
                        worksheet.write_number(row_num, col_num, *value as f64)?;
                    }
                    ReportCell::Money(value) => {
                        let number = value.to_f64().unwrap_or_default();
                        worksheet.write_number_with_format(row_num, col_num, number, &money)?;
                    }
                    ReportCell::Date(value) => {
                        let excel_date = ExcelDateTime::from_ymd(
                            value.year() as u16,
                            value.month() as u8,
                            value.day() as u8,
                        )?;
                        worksheet.write_datetime_with_format(row_num, col_num, &excel_date, &date)?;
                    }
                }
            }
        }

        if !table.rows.is_empty() {
            let columns: Vec<TableColumn> = table
                .columns
                .iter()
                .map(|header| TableColumn::new().set_header(header))
                .collect();
            let mut excel_table = rust_xlsxwriter::Table::new();
            excel_table.set_autofilter(true).set_columns(&columns);
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
        }
        worksheet.autofit();
    }

    workbook_writer.save(path)?;
    Ok(())
}
