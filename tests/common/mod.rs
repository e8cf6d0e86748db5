#![allow(dead_code)]

use chrono::NaiveDate;
use scholarship_reports::calendar::{FiscalCalendar, FiscalYearRange};
use scholarship_reports::config::FundConfig;
use scholarship_reports::io::table::{Cell, Table};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn calendar() -> FiscalCalendar {
    FundConfig::default().calendar().expect("default calendar")
}

/// FY2024 and FY2025 only, one year shorter than the default calendar.
pub fn two_year_calendar() -> FiscalCalendar {
    let ranges = vec![
        FiscalYearRange {
            name: "FY2024".into(),
            begin: date(2023, 9, 1),
            end: date(2024, 8, 31),
        },
        FiscalYearRange {
            name: "FY2025".into(),
            begin: date(2024, 9, 1),
            end: date(2025, 8, 31),
        },
    ];
    FiscalCalendar::new(ranges, 2023, 3).expect("two-year calendar")
}

/// Payment export rows: (date, type, payee, amount).
pub fn payments_table(rows: &[(&str, &str, &str, f64)]) -> Table {
    let mut table = Table::new(&["Date", "Type", "Payee", "Memo", "Payment"]);
    for (date, row_type, payee, amount) in rows {
        table.push_row(vec![
            Cell::from(*date),
            Cell::from(*row_type),
            Cell::from(*payee),
            Cell::Empty,
            Cell::Number(*amount),
        ]);
    }
    table
}

/// Four donors spread over FY2024..FY2026:
///
/// - Alice gives in FY2024 and FY2025,
/// - Bob in FY2024 and FY2026,
/// - Carol only in FY2025,
/// - Dan only in FY2026, above the major-donor threshold.
pub fn sample_payments() -> Table {
    payments_table(&[
        ("10/01/2023", "Payment", "Alice Adams", 100.0),
        ("10/01/2023", "Payment", "Bob Brown", 300.0),
        ("10/01/2024", "Payment", "Alice Adams", 200.0),
        ("10/01/2024", "Sales Receipt", "Carol Chen", 50.0),
        ("10/01/2025", "Payment", "Bob Brown", 500.0),
        ("10/01/2025", "Payment", "Dan Diaz", 2500.0),
    ])
}

/// Bill export rows: (bill date, type, vendor, memo, amount).
pub fn bills_table(rows: &[(NaiveDate, &str, &str, &str, f64)]) -> Table {
    let mut table = Table::new(&["Bill date", "Type", "Vendor", "Memo", "Amount"]);
    for (bill_date, bill_type, vendor, memo, amount) in rows {
        table.push_row(vec![
            Cell::Date(*bill_date),
            Cell::from(*bill_type),
            Cell::from(*vendor),
            Cell::from(*memo),
            Cell::Number(*amount),
        ]);
    }
    table
}
