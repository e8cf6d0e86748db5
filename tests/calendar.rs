mod common;

use common::{calendar, date, two_year_calendar};
use rust_decimal_macros::dec;
use scholarship_reports::FundError;
use scholarship_reports::calendar::{FiscalCalendar, FiscalYearRange};
use scholarship_reports::io::table::{Cell, Table, TableSource};

#[test]
fn fiscal_year_bounds_are_inclusive() {
    let calendar = calendar();
    let fy2024 = calendar.find("FY2024").expect("FY2024 configured");

    assert_eq!(calendar.fiscal_year_of(date(2023, 9, 1)), Some(fy2024));
    assert_eq!(calendar.fiscal_year_of(date(2024, 2, 29)), Some(fy2024));
    assert_eq!(calendar.fiscal_year_of(date(2024, 8, 31)), Some(fy2024));
    assert_ne!(calendar.fiscal_year_of(date(2024, 9, 1)), Some(fy2024));
}

#[test]
fn dates_outside_the_chain_are_out_of_range() {
    let calendar = calendar();

    assert_eq!(calendar.fiscal_year_of(date(2023, 8, 31)), None);
    assert_eq!(calendar.fiscal_year_of(date(2026, 9, 1)), None);
}

#[test]
fn prior_chain_terminates_after_the_earliest_year() {
    let calendar = calendar();
    let fy2024 = calendar.find("FY2024").expect("FY2024 configured");
    let fy2025 = calendar.find("fy2025").expect("lookup ignores case");
    let fy2026 = calendar.latest();

    assert_eq!(calendar.earliest(), fy2024);
    assert_eq!(calendar.prior(fy2026), Some(fy2025));
    assert_eq!(calendar.prior(fy2025), Some(fy2024));
    assert_eq!(calendar.prior(fy2024), None);
}

#[test]
fn calendar_years_are_bounded_to_the_window() {
    let calendar = calendar();

    let cy = calendar
        .calendar_year_of(date(2024, 12, 31))
        .expect("2024 in window");
    assert_eq!(calendar.calendar_year_value(cy), 2024);
    assert_eq!(calendar.calendar_year_of(date(2022, 12, 31)), None);
    assert_eq!(calendar.calendar_year_of(date(2027, 1, 1)), None);
}

#[test]
fn gaps_between_fiscal_years_are_rejected() {
    let ranges = vec![
        FiscalYearRange {
            name: "FY2024".into(),
            begin: date(2023, 9, 1),
            end: date(2024, 8, 31),
        },
        FiscalYearRange {
            name: "FY2025".into(),
            begin: date(2024, 9, 2),
            end: date(2025, 8, 31),
        },
    ];

    let error = FiscalCalendar::new(ranges, 2023, 3).expect_err("gap must be rejected");
    assert!(matches!(error, FundError::InvalidConfig(_)));
}

#[test]
fn unknown_fiscal_year_name_is_a_lookup_miss() {
    let error = calendar().find("FY1999").expect_err("not configured");

    assert!(matches!(error, FundError::NotFound { .. }));
    assert!(!error.is_fatal());
}

#[test]
fn table_cells_parse_export_formats() {
    let table = Table::new(&["Date", "Payment"])
        .with_row(vec![Cell::from("01/05/2024"), Cell::from("$1,250.50")])
        .with_row(vec![Cell::from("1/5/24"), Cell::from("(75.00)")])
        .with_row(vec![Cell::Number(45296.0), Cell::Number(19.999)])
        .with_row(vec![Cell::from("2024-01-05 00:00:00"), Cell::Empty]);

    assert_eq!(table.row_count(), 5);
    for row in 1..=3 {
        assert_eq!(
            table.cell_as_date(row, "Date").expect("date parses"),
            Some(date(2024, 1, 5))
        );
    }
    assert_eq!(
        table.cell_as_date(4, "date").expect("heading ignores case"),
        Some(date(2024, 1, 5))
    );
    assert_eq!(
        table.cell_as_decimal(1, "Payment").expect("amount parses"),
        Some(dec!(1250.50))
    );
    assert_eq!(
        table.cell_as_decimal(2, "Payment").expect("amount parses"),
        Some(dec!(-75))
    );
    assert_eq!(
        table.cell_as_decimal(3, "Payment").expect("amount parses"),
        Some(dec!(20.00))
    );
    assert_eq!(table.cell_as_decimal(4, "Payment").expect("blank"), None);
}

#[test]
fn malformed_cells_and_headings_are_input_errors() {
    let table = Table::new(&["Date", "Payment"]).with_row(vec!["13/45/2024", "ten dollars"]);

    let date_error = table.cell_as_date(1, "Date").expect_err("bad date");
    assert!(matches!(date_error, FundError::InvalidDate { row: 1, .. }));

    let amount_error = table.cell_as_decimal(1, "Payment").expect_err("bad amount");
    assert!(matches!(amount_error, FundError::InvalidDecimal { row: 1, .. }));

    let column_error = table.cell(1, "Vendor").expect_err("no such heading");
    assert!(matches!(column_error, FundError::MissingColumn { .. }));
    assert!(!column_error.is_fatal());
}

#[test]
fn fiscal_year_from_a_longer_calendar_is_rejected() {
    let short = two_year_calendar();
    let foreign = calendar().latest();

    assert!(short.is_valid(short.latest()));
    assert!(!short.is_valid(foreign));
    assert_eq!(short.check(short.earliest()).ok(), Some(short.earliest()));

    let error = short.check(foreign).expect_err("FY2026 is not in the short calendar");
    assert!(matches!(error, FundError::Invariant(_)));
    assert!(error.is_fatal());
}
