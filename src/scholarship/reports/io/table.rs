//! Row/column addressed view over spreadsheet exports.
//!
//! Row 0 is always the header row. Data rows are numbered from 1 up to
//! `row_count() - 1`, matching what a bookkeeper sees in the sheet below the
//! headings.

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::scholarship::reports::error::{FundError, Result};

/// Excel stores dates as day counts from this epoch (with the 1900 leap-year
/// bug folded in).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Read access the aggregation core needs from a spreadsheet.
pub trait TableSource {
    /// Number of rows including the header row.
    fn row_count(&self) -> usize;

    /// Trimmed text of a cell, empty for blank cells.
    fn cell(&self, row: usize, column: &str) -> Result<String>;

    /// Cell interpreted as a date, `None` when blank.
    fn cell_as_date(&self, row: usize, column: &str) -> Result<Option<NaiveDate>>;

    /// Cell interpreted as a monetary amount, `None` when blank.
    fn cell_as_decimal(&self, row: usize, column: &str) -> Result<Option<Decimal>>;

    /// Data row numbers, skipping the header.
    fn data_rows(&self) -> std::ops::Range<usize> {
        1..self.row_count().max(1)
    }
}

/// A single value loaded from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from(value.as_str())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl Cell {
    fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.trim().to_string(),
            Cell::Number(value) => value.to_string(),
            Cell::Date(value) => value.format("%Y-%m-%d").to_string(),
        }
    }
}

/// In-memory table: one header row followed by data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given column headings.
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        Self {
            header: header
                .iter()
                .map(|heading| heading.as_ref().trim().to_string())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a data row. Short rows read as blank in the missing columns.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Builder-style variant of [`Table::push_row`].
    pub fn with_row<I, C>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.push_row(row.into_iter().map(Into::into).collect());
        self
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|heading| heading.eq_ignore_ascii_case(column))
            .ok_or_else(|| FundError::MissingColumn {
                column: column.to_string(),
            })
    }

    fn raw(&self, row: usize, column: &str) -> Result<&Cell> {
        let index = self.column_index(column)?;
        if row == 0 || row > self.rows.len() {
            return Err(FundError::Invariant(format!(
                "row {row} is not a data row of a table with {} rows",
                self.row_count()
            )));
        }
        Ok(self.rows[row - 1].get(index).unwrap_or(&Cell::Empty))
    }
}

impl TableSource for Table {
    fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    fn cell(&self, row: usize, column: &str) -> Result<String> {
        if row == 0 {
            let index = self.column_index(column)?;
            return Ok(self.header[index].clone());
        }
        Ok(self.raw(row, column)?.to_text())
    }

    fn cell_as_date(&self, row: usize, column: &str) -> Result<Option<NaiveDate>> {
        let invalid = |value: String| FundError::InvalidDate {
            row,
            column: column.to_string(),
            value,
        };

        match self.raw(row, column)? {
            Cell::Empty => Ok(None),
            Cell::Date(date) => Ok(Some(*date)),
            Cell::Number(serial) => excel_serial_to_date(*serial)
                .map(Some)
                .ok_or_else(|| invalid(serial.to_string())),
            Cell::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                parse_date(text)
                    .map(Some)
                    .ok_or_else(|| invalid(text.to_string()))
            }
        }
    }

    fn cell_as_decimal(&self, row: usize, column: &str) -> Result<Option<Decimal>> {
        let invalid = |value: String| FundError::InvalidDecimal {
            row,
            column: column.to_string(),
            value,
        };

        match self.raw(row, column)? {
            Cell::Empty => Ok(None),
            Cell::Number(value) => Decimal::try_from(*value)
                .map(|amount| {
                    Some(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
                })
                .map_err(|_| invalid(value.to_string())),
            Cell::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                parse_amount(text)
                    .map(Some)
                    .ok_or_else(|| invalid(text.to_string()))
            }
            Cell::Date(date) => Err(invalid(date.to_string())),
        }
    }
}

/// Converts an Excel serial day number into a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Parses the date layouts accounting exports use: `MM/DD/YYYY`, `M/D/YY`,
/// and ISO dates, optionally followed by a time of day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date_part = text
        .split(|ch: char| ch == ' ' || ch == 'T')
        .next()
        .unwrap_or(text);

    if date_part.contains('/') {
        let year_digits = date_part.rsplit('/').next().map_or(0, str::len);
        let format = if year_digits == 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
        return NaiveDate::parse_from_str(date_part, format).ok();
    }

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parses a monetary amount, tolerating currency symbols, thousands
/// separators and accounting-style parentheses for negatives.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let mut cleaned = text.trim();
    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative {
        cleaned = &cleaned[1..cleaned.len() - 1];
    }

    let digits: String = cleaned
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();
    let amount = Decimal::from_str(&digits).ok()?;
    Some(if negative { -amount } else { amount })
}
