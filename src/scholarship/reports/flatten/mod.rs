//! Turns aggregates into sheet-shaped tables.
//!
//! Nothing here knows about cell addresses; the writers in
//! [`io`](crate::scholarship::reports::io) decide how a [`SheetTable`] lands
//! in a file.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::donors::cohort::{Cohort, CohortSummary};
use crate::scholarship::reports::donors::donor::Donor;
use crate::scholarship::reports::donors::major::MajorDonorSummary;
use crate::scholarship::reports::donors::retention::{
    CalendarYearTotals, MailingEntry, RetentionSummary,
};
use crate::scholarship::reports::grants::awards::{AwardGroups, AwardMiss};
use crate::scholarship::reports::grants::{GrantLedger, KindTotals, TransactionKind};

pub const DONOR_COUNTS_SHEET: &str = "Donor Counts";
pub const MAJOR_DONORS_SHEET: &str = "Major Donors";
pub const MAJOR_DONOR_LIST_SHEET: &str = "Major Donor List";
pub const RETENTION_SHEET: &str = "Retention";
pub const LAPSED_DONORS_SHEET: &str = "Lapsed Donors";
pub const CALENDAR_YEARS_SHEET: &str = "Calendar Years";
pub const MAILING_LIST_SHEET: &str = "Mailing List";
pub const GRANT_LEDGER_SHEET: &str = "Grant Ledger";
pub const GRANT_TOTALS_SHEET: &str = "Grant Totals";
pub const RECIPIENT_PAYMENTS_SHEET: &str = "Recipient Payments";
pub const OUTSTANDING_SHEET: &str = "Outstanding";
pub const AWARD_GROUPS_SHEET: &str = "Award Groups";
pub const UNMATCHED_BILLS_SHEET: &str = "Unmatched Bills";

/// A typed value destined for one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Empty,
    Text(String),
    Integer(i64),
    Money(Decimal),
    Date(NaiveDate),
}

impl From<&str> for ReportCell {
    fn from(value: &str) -> Self {
        ReportCell::Text(value.to_string())
    }
}

impl From<String> for ReportCell {
    fn from(value: String) -> Self {
        ReportCell::Text(value)
    }
}

impl From<usize> for ReportCell {
    fn from(value: usize) -> Self {
        ReportCell::Integer(value as i64)
    }
}

impl From<Decimal> for ReportCell {
    fn from(value: Decimal) -> Self {
        ReportCell::Money(value)
    }
}

impl From<NaiveDate> for ReportCell {
    fn from(value: NaiveDate) -> Self {
        ReportCell::Date(value)
    }
}

/// Whole-number percentages are written as integers.
fn percent(value: Decimal) -> ReportCell {
    ReportCell::Integer(value.to_i64().unwrap_or_default())
}

/// A table that will be materialised as one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Looks up a cell by row index and column heading.
    pub fn cell(&self, row: usize, column: &str) -> Option<&ReportCell> {
        let index = self.columns.iter().position(|heading| heading == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Represents all tables of one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet_name)
    }
}

fn headings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn donor_counts_table(summary: &CohortSummary) -> SheetTable {
    let mut columns = headings(&["Fiscal Year"]);
    for cohort in Cohort::ALL {
        let label = cohort.label();
        columns.push(format!("{label} Donors"));
        columns.push(format!("{label} Amount"));
        columns.push(format!("{label} Average"));
    }
    columns.extend(headings(&[
        "Total Donors",
        "Total Amount",
        "Average Gift",
        "Average Change %",
    ]));

    let mut table = SheetTable::new(DONOR_COUNTS_SHEET, columns);
    for year in &summary.years {
        let mut row: Vec<ReportCell> = vec![year.name.as_str().into()];
        for cohort in Cohort::ALL {
            row.push(year.count(cohort).into());
            row.push(year.sum(cohort).into());
            row.push(year.average(cohort).into());
        }
        row.push(year.total_count().into());
        row.push(year.total_amount().into());
        row.push(year.overall_average().into());
        row.push(percent(year.percent_change));
        table.rows.push(row);
    }
    table
}

pub fn major_donors_table(summary: &MajorDonorSummary) -> SheetTable {
    let mut table = SheetTable::new(
        MAJOR_DONORS_SHEET,
        headings(&[
            "Fiscal Year",
            "Major Donors",
            "Total",
            "Average",
            "% of Donations",
            "Average Change %",
        ]),
    );
    for year in &summary.years {
        table.rows.push(vec![
            year.name.as_str().into(),
            year.count.into(),
            year.total.into(),
            year.average.into(),
            percent(year.percent_of_total),
            percent(year.percent_change),
        ]);
    }
    table
}

/// Everyone who reached the threshold in at least one year, with every
/// year's gift.
pub fn major_donor_list_table<'a>(
    donors: impl IntoIterator<Item = &'a Donor>,
    calendar: &FiscalCalendar,
    threshold: Decimal,
) -> SheetTable {
    let mut columns = headings(&["Name"]);
    columns.extend(calendar.fiscal_years().map(|fy| calendar.name(fy).to_string()));
    columns.push("Total".to_string());

    let mut table = SheetTable::new(MAJOR_DONOR_LIST_SHEET, columns);
    for donor in donors {
        if !donor.is_major_donor_overall(calendar, threshold) {
            continue;
        }
        let mut row: Vec<ReportCell> = vec![donor.name().into()];
        row.extend(calendar.fiscal_years().map(|fy| donor.donation(fy).into()));
        row.push(donor.total().into());
        table.rows.push(row);
    }
    table
}

pub fn retention_table(summary: &RetentionSummary) -> SheetTable {
    let mut table = SheetTable::new(
        RETENTION_SHEET,
        headings(&[
            "Fiscal Year",
            "Prior Year Donors",
            "Retained",
            "Lapsed",
            "Retention %",
        ]),
    );
    for year in &summary.years {
        table.rows.push(vec![
            year.name.as_str().into(),
            year.prior_donors.into(),
            year.retained.into(),
            year.lapsed.into(),
            percent(year.retention_percent),
        ]);
    }
    table
}

/// Donors who gave in `prior` but not in the report year.
pub fn lapsed_donors_table(donors: &[&Donor], prior: FiscalYear) -> SheetTable {
    let mut table = SheetTable::new(
        LAPSED_DONORS_SHEET,
        headings(&["Name", "Prior Year Gift", "Email"]),
    );
    for donor in donors {
        table.rows.push(vec![
            donor.name().into(),
            donor.donation(prior).into(),
            donor.email.as_str().into(),
        ]);
    }
    table
}

pub fn calendar_years_table(totals: &[CalendarYearTotals]) -> SheetTable {
    let mut table = SheetTable::new(CALENDAR_YEARS_SHEET, headings(&["Year", "Donors", "Total"]));
    for year in totals {
        table.rows.push(vec![
            ReportCell::Integer(i64::from(year.year)),
            year.donors.into(),
            year.total.into(),
        ]);
    }
    table
}

pub fn mailing_list_table(entries: &[MailingEntry<'_>]) -> SheetTable {
    let mut table = SheetTable::new(
        MAILING_LIST_SHEET,
        headings(&[
            "Name",
            "Street",
            "City",
            "State",
            "Zip",
            "Email",
            "Household",
            "Major Donor",
        ]),
    );
    for entry in entries {
        let donor = entry.donor;
        table.rows.push(vec![
            donor.name().into(),
            donor.address.street.as_str().into(),
            donor.address.city.as_str().into(),
            donor.address.state.as_str().into(),
            donor.address.zip.as_str().into(),
            donor.email.as_str().into(),
            donor
                .household_size
                .map_or(ReportCell::Empty, |size| ReportCell::Integer(i64::from(size))),
            (if entry.major { "Yes" } else { "No" }).into(),
        ]);
    }
    table
}

/// The ledger in recipient order with a running balance, and a balance row
/// closing each recipient.
pub fn grant_ledger_table(ledger: &GrantLedger, calendar: &FiscalCalendar) -> SheetTable {
    let mut table = SheetTable::new(
        GRANT_LEDGER_SHEET,
        headings(&[
            "Recipient",
            "Date",
            "Fiscal Year",
            "Type",
            "Institution",
            "Amount",
            "Balance",
        ]),
    );

    for line in ledger.balances() {
        let transaction = line.transaction;
        let recipient = ledger.recipient(transaction.recipient);
        table.rows.push(vec![
            recipient.into(),
            transaction.date.into(),
            transaction
                .fiscal_year
                .map_or(ReportCell::Empty, |fy| calendar.name(fy).into()),
            transaction.kind.label().into(),
            ledger.institution(transaction.institution).into(),
            transaction.signed_amount().into(),
            line.balance.into(),
        ]);

        if line.closes_recipient {
            table.rows.push(vec![
                format!("{recipient} balance").into(),
                ReportCell::Empty,
                ReportCell::Empty,
                ReportCell::Empty,
                ReportCell::Empty,
                ReportCell::Empty,
                line.balance.into(),
            ]);
        }
    }
    table
}

pub fn grant_totals_table(ledger: &GrantLedger, calendar: &FiscalCalendar) -> SheetTable {
    let mut columns = headings(&["Fiscal Year"]);
    columns.extend(TransactionKind::ALL.iter().map(|kind| kind.label().to_string()));
    columns.push("Net Balance".to_string());

    let totals = ledger.totals(calendar);
    let mut table = SheetTable::new(GRANT_TOTALS_SHEET, columns);
    let totals_row = |label: &str, totals: &KindTotals| -> Vec<ReportCell> {
        let mut row: Vec<ReportCell> = vec![label.into()];
        row.extend(TransactionKind::ALL.iter().map(|kind| totals.amount(*kind).into()));
        row.push(totals.net_balance().into());
        row
    };

    for (fy, year_totals) in &totals.years {
        table.rows.push(totals_row(calendar.name(*fy), year_totals));
    }
    if totals.out_of_range != KindTotals::default() {
        table
            .rows
            .push(totals_row("Outside fiscal years", &totals.out_of_range));
    }
    table.rows.push(totals_row("All years", &totals.overall));
    table
}

pub fn recipient_payments_table(ledger: &GrantLedger, calendar: &FiscalCalendar) -> SheetTable {
    let mut columns = headings(&["Recipient"]);
    columns.extend(calendar.fiscal_years().map(|fy| calendar.name(fy).to_string()));
    columns.push("Total".to_string());

    let mut table = SheetTable::new(RECIPIENT_PAYMENTS_SHEET, columns);
    for sum in ledger.recipient_payments(calendar) {
        let mut row: Vec<ReportCell> = vec![sum.name.as_str().into()];
        row.extend(calendar.fiscal_years().map(|fy| sum.paid(fy).into()));
        row.push(sum.total().into());
        table.rows.push(row);
    }
    table
}

pub fn outstanding_table(ledger: &GrantLedger) -> SheetTable {
    let mut table = SheetTable::new(OUTSTANDING_SHEET, headings(&["Recipient", "Balance"]));
    for balance in ledger.outstanding_balances() {
        table
            .rows
            .push(vec![balance.name.into(), balance.balance.into()]);
    }
    table
}

pub fn award_groups_table(groups: &AwardGroups) -> SheetTable {
    let mut table = SheetTable::new(
        AWARD_GROUPS_SHEET,
        headings(&["Award Group", "Award Date", "Begin", "End", "Bills"]),
    );
    for group in groups.groups() {
        table.rows.push(vec![
            group.name().into(),
            group.award_date().into(),
            group.begin().into(),
            group.end().into(),
            group.count().into(),
        ]);
    }
    table
}

pub fn unmatched_bills_table(misses: &[AwardMiss]) -> SheetTable {
    let mut table = SheetTable::new(
        UNMATCHED_BILLS_SHEET,
        headings(&["Bill Date", "Recipient", "Amount"]),
    );
    for miss in misses {
        table.rows.push(vec![
            miss.date.into(),
            miss.recipient.as_str().into(),
            miss.amount.into(),
        ]);
    }
    table
}
