//! End-to-end report runs: read the exports, aggregate, flatten, write.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::config::FundConfig;
use crate::scholarship::reports::donors::retention::{calendar_year_totals, mailing_list};
use crate::scholarship::reports::donors::{
    CohortSummary, DonorLedger, MajorDonorSummary, RetentionSummary, non_repeat_donors,
};
use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::flatten::{self, WorkbookData};
use crate::scholarship::reports::grants::{AwardGroups, AwardMiss, GrantLedger};
use crate::scholarship::reports::io::{self, excel_read};

/// Inputs of a donor report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorReportRequest {
    /// Payment export listing donations.
    pub payments: PathBuf,
    pub payments_sheet: Option<String>,
    /// Optional address list for the mailing list.
    pub addresses: Option<PathBuf>,
    pub addresses_sheet: Option<String>,
    /// Fiscal year of the mailing and lapsed-donor lists; latest when unset.
    pub fiscal_year: Option<String>,
    pub output: PathBuf,
}

/// Inputs of a grant report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantReportRequest {
    /// Bill export with grants and transfers.
    pub bills: PathBuf,
    pub bills_sheet: Option<String>,
    /// Optional payment export with grant payments, write-offs and refunds.
    pub payments: Option<PathBuf>,
    pub payments_sheet: Option<String>,
    /// Abort when a grant bill falls in no award group.
    pub strict_awards: bool,
    pub output: PathBuf,
}

/// Runs the donor report and returns the tables that were written.
#[instrument(
    level = "info",
    skip_all,
    fields(payments = %request.payments.display(), output = %request.output.display())
)]
pub fn donor_report(request: &DonorReportRequest, config: &FundConfig) -> Result<WorkbookData> {
    ensure_writable_format(&request.output)?;
    ensure_exists(&request.payments)?;
    if let Some(addresses) = &request.addresses {
        ensure_exists(addresses)?;
    }

    let calendar = config.calendar()?;
    let target = match &request.fiscal_year {
        Some(name) => calendar.find(name)?,
        None => calendar.latest(),
    };

    let mut ledger = DonorLedger::new();
    let payments = excel_read::read_table(&request.payments, request.payments_sheet.as_deref())?;
    ledger.ingest_payments(&payments, &calendar, config)?;
    if let Some(path) = &request.addresses {
        let addresses = excel_read::read_table(path, request.addresses_sheet.as_deref())?;
        ledger.ingest_addresses(&addresses, &calendar)?;
    }

    let workbook = build_donor_workbook(&ledger, &calendar, config, target)?;
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    io::write_report(&request.output, &workbook)?;
    info!(donors = ledger.len(), "donor report written");
    Ok(workbook)
}

/// Derives every donor sheet from an already populated ledger. `target` must
/// come from `calendar`.
pub fn build_donor_workbook(
    ledger: &DonorLedger,
    calendar: &FiscalCalendar,
    config: &FundConfig,
    target: FiscalYear,
) -> Result<WorkbookData> {
    let target = calendar.check(target)?;
    let threshold = config.major_donor_threshold;
    let cohorts = CohortSummary::build(ledger, calendar);
    let major = MajorDonorSummary::build(ledger, calendar, threshold);
    let retention = RetentionSummary::build(ledger, calendar);
    let mailing = mailing_list(ledger, target, calendar, threshold);

    let mut tables = vec![
        flatten::donor_counts_table(&cohorts),
        flatten::major_donors_table(&major),
        flatten::major_donor_list_table(ledger.iter(), calendar, threshold),
        flatten::retention_table(&retention),
    ];
    if let Some(prior) = calendar.prior(target) {
        let lapsed = non_repeat_donors(ledger, target, calendar);
        tables.push(flatten::lapsed_donors_table(&lapsed, prior));
    }
    tables.push(flatten::calendar_years_table(&calendar_year_totals(
        ledger, calendar,
    )));
    tables.push(flatten::mailing_list_table(&mailing));

    Ok(WorkbookData { tables })
}

/// Runs the grant report and returns the tables that were written.
#[instrument(
    level = "info",
    skip_all,
    fields(bills = %request.bills.display(), output = %request.output.display())
)]
pub fn grant_report(request: &GrantReportRequest, config: &FundConfig) -> Result<WorkbookData> {
    ensure_writable_format(&request.output)?;
    ensure_exists(&request.bills)?;
    if let Some(payments) = &request.payments {
        ensure_exists(payments)?;
    }

    let calendar = config.calendar()?;
    let mut awards = config.award_groups()?;

    let mut ledger = GrantLedger::new();
    let bills = excel_read::read_table(&request.bills, request.bills_sheet.as_deref())?;
    ledger.ingest_bills(&bills, &calendar, &config.grants)?;
    if let Some(path) = &request.payments {
        let payments = excel_read::read_table(path, request.payments_sheet.as_deref())?;
        ledger.ingest_payments(&payments, &calendar, &config.grants)?;
    }

    let misses = awards.tally(&ledger);
    if request.strict_awards {
        if let Some(miss) = misses.first() {
            return Err(FundError::not_found("award group", miss.date.to_string()));
        }
    }

    let workbook = build_grant_workbook(&ledger, &calendar, &awards, &misses);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    io::write_report(&request.output, &workbook)?;
    info!(transactions = ledger.len(), "grant report written");
    Ok(workbook)
}

/// Derives every grant sheet from a populated ledger and tallied awards.
pub fn build_grant_workbook(
    ledger: &GrantLedger,
    calendar: &FiscalCalendar,
    awards: &AwardGroups,
    misses: &[AwardMiss],
) -> WorkbookData {
    let mut tables = vec![
        flatten::grant_ledger_table(ledger, calendar),
        flatten::grant_totals_table(ledger, calendar),
        flatten::recipient_payments_table(ledger, calendar),
        flatten::outstanding_table(ledger),
        flatten::award_groups_table(awards),
    ];
    if !misses.is_empty() {
        tables.push(flatten::unmatched_bills_table(misses));
    }
    WorkbookData { tables }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(FundError::MissingInput(path.to_path_buf()))
    }
}

fn ensure_writable_format(path: &Path) -> Result<()> {
    io::detect_format(path)
        .map(|_| ())
        .ok_or_else(|| FundError::UnsupportedOutput(path.to_path_buf()))
}
