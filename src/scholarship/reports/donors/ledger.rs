use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, info};

use crate::scholarship::reports::calendar::FiscalCalendar;
use crate::scholarship::reports::config::FundConfig;
use crate::scholarship::reports::donors::donor::{Donor, donor_key};
use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::io::columns;
use crate::scholarship::reports::io::table::TableSource;

/// Row accounting for one payment ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Data rows scanned.
    pub rows: usize,
    /// Rows credited to a donor.
    pub accepted: usize,
    /// Rows whose payee is on the excluded list.
    pub excluded: usize,
    /// Rows with a blank payee, a non-donation type, or no amount.
    pub skipped: usize,
    /// Rows dated outside both the fiscal and the calendar window.
    pub out_of_range: usize,
}

/// Name-keyed collection of donors, rebuilt from the exports on every run.
///
/// Two different people with the same name share one entry.
#[derive(Debug, Clone, Default)]
pub struct DonorLedger {
    donors: BTreeMap<String, Donor>,
}

impl DonorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans payment rows once and credits each donation to the fiscal-year
    /// and calendar-year slots of its date.
    pub fn ingest_payments<S: TableSource>(
        &mut self,
        source: &S,
        calendar: &FiscalCalendar,
        config: &FundConfig,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();

        for row in source.data_rows() {
            summary.rows += 1;

            let payee = source.cell(row, columns::PAYEE)?;
            if payee.is_empty() {
                summary.skipped += 1;
                continue;
            }
            if config.is_excluded_payee(&payee) {
                debug!(row, payee = %payee, "excluded payee skipped");
                summary.excluded += 1;
                continue;
            }
            if !config.donation_types.is_empty() {
                let row_type = source.cell(row, columns::TYPE)?;
                if !config.is_donation_type(&row_type) {
                    debug!(row, row_type = %row_type, "non-donation row skipped");
                    summary.skipped += 1;
                    continue;
                }
            }

            let Some(amount) = source.cell_as_decimal(row, columns::PAYMENT)? else {
                summary.skipped += 1;
                continue;
            };
            let date = source
                .cell_as_date(row, columns::DATE)?
                .ok_or_else(|| FundError::InvalidDate {
                    row,
                    column: columns::DATE.to_string(),
                    value: String::new(),
                })?;

            let fiscal_year = calendar.fiscal_year_of(date);
            let calendar_year = calendar.calendar_year_of(date);
            if fiscal_year.is_none() && calendar_year.is_none() {
                debug!(row, %date, "payment outside the configured years");
                summary.out_of_range += 1;
                continue;
            }

            let donor = self.entry(&payee, calendar)?;
            if let Some(fy) = fiscal_year {
                donor.add_donation(fy, amount)?;
            }
            if let Some(cy) = calendar_year {
                donor.add_cal_donation(cy, amount)?;
            }
            summary.accepted += 1;
        }

        info!(
            rows = summary.rows,
            accepted = summary.accepted,
            excluded = summary.excluded,
            donors = self.donors.len(),
            "ingested donation payments"
        );
        Ok(summary)
    }

    /// Merges an address list into the ledger. Donors who have not paid yet
    /// are added with zero totals. Returns the number of rows applied.
    pub fn ingest_addresses<S: TableSource>(
        &mut self,
        source: &S,
        calendar: &FiscalCalendar,
    ) -> Result<usize> {
        let mut applied = 0;

        for row in source.data_rows() {
            let name = source.cell(row, columns::NAME)?;
            if name.is_empty() {
                continue;
            }

            let street = optional_cell(source, row, columns::STREET)?;
            let city = optional_cell(source, row, columns::CITY)?;
            let state = optional_cell(source, row, columns::STATE)?;
            let zip = optional_cell(source, row, columns::ZIP)?;
            let email = optional_cell(source, row, columns::EMAIL)?;
            let household = optional_cell(source, row, columns::HOUSEHOLD)?;

            let donor = self.entry(&name, calendar)?;
            donor.address.street = street;
            donor.address.city = city;
            donor.address.state = state;
            donor.address.zip = zip;
            if !email.is_empty() {
                donor.email = email;
            }
            donor.household_size = household
                .parse::<f64>()
                .ok()
                .filter(|size| *size >= 1.0)
                .map(|size| size as u32);
            applied += 1;
        }

        info!(rows = applied, donors = self.donors.len(), "merged address list");
        Ok(applied)
    }

    /// Looks a donor up by display name.
    pub fn get(&self, name: &str) -> Result<&Donor> {
        self.donors
            .get(&donor_key(name))
            .ok_or_else(|| FundError::not_found("donor", name))
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }

    /// Donors in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Donor> {
        self.donors.values()
    }

    fn entry(&mut self, name: &str, calendar: &FiscalCalendar) -> Result<&mut Donor> {
        match self.donors.entry(donor_key(name)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(Donor::new(name, calendar)?)),
        }
    }
}

fn optional_cell<S: TableSource>(source: &S, row: usize, column: &str) -> Result<String> {
    match source.cell(row, column) {
        Err(FundError::MissingColumn { .. }) => Ok(String::new()),
        other => other,
    }
}
