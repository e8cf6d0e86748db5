//! Retention, tax-year and mailing-list views over the donor ledger.

use rust_decimal::Decimal;

use crate::scholarship::reports::calendar::{CalendarYear, FiscalCalendar, FiscalYear};
use crate::scholarship::reports::donors::cohort::percent_of;
use crate::scholarship::reports::donors::donor::Donor;
use crate::scholarship::reports::donors::ledger::DonorLedger;

/// How many of last year's donors gave again.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionYear {
    pub fiscal_year: FiscalYear,
    pub name: String,
    /// Donors who gave in the prior fiscal year.
    pub prior_donors: usize,
    pub retained: usize,
    /// Prior-year donors who did not give this year.
    pub lapsed: usize,
    pub retention_percent: Decimal,
}

/// Retention per fiscal year. The earliest year has no prior and is left out.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionSummary {
    pub years: Vec<RetentionYear>,
}

impl RetentionSummary {
    pub fn build(ledger: &DonorLedger, calendar: &FiscalCalendar) -> Self {
        let years = calendar
            .fiscal_years()
            .filter_map(|fy| {
                let prior = calendar.prior(fy)?;
                let prior_donors = ledger.iter().filter(|donor| donor.donated_in(prior)).count();
                let lapsed = ledger
                    .iter()
                    .filter(|donor| donor.is_non_repeat_donor(fy, calendar))
                    .count();
                let retained = prior_donors - lapsed;
                Some(RetentionYear {
                    fiscal_year: fy,
                    name: calendar.name(fy).to_string(),
                    prior_donors,
                    retained,
                    lapsed,
                    retention_percent: percent_of(
                        Decimal::from(retained),
                        Decimal::from(prior_donors),
                    ),
                })
            })
            .collect();

        Self { years }
    }
}

/// Donors flagged non-repeat for `fy`, in ledger order.
pub fn non_repeat_donors<'a>(
    ledger: &'a DonorLedger,
    fy: FiscalYear,
    calendar: &FiscalCalendar,
) -> Vec<&'a Donor> {
    ledger
        .iter()
        .filter(|donor| donor.is_non_repeat_donor(fy, calendar))
        .collect()
}

/// Donor count and total for one calendar (tax) year.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarYearTotals {
    pub calendar_year: CalendarYear,
    pub year: i32,
    pub donors: usize,
    pub total: Decimal,
}

pub fn calendar_year_totals(
    ledger: &DonorLedger,
    calendar: &FiscalCalendar,
) -> Vec<CalendarYearTotals> {
    calendar
        .calendar_years()
        .map(|cy| {
            let (donors, total) = ledger
                .iter()
                .map(|donor| donor.cal_donation(cy))
                .filter(|amount| *amount > Decimal::ZERO)
                .fold((0, Decimal::ZERO), |(count, sum), amount| {
                    (count + 1, sum + amount)
                });
            CalendarYearTotals {
                calendar_year: cy,
                year: calendar.calendar_year_value(cy),
                donors,
                total,
            }
        })
        .collect()
}

/// One addressee of the appeal mailing.
#[derive(Debug, Clone, PartialEq)]
pub struct MailingEntry<'a> {
    pub donor: &'a Donor,
    pub major: bool,
}

/// Donors with a mailable address who gave in `fy` or the year before,
/// sorted by name.
pub fn mailing_list<'a>(
    ledger: &'a DonorLedger,
    fy: FiscalYear,
    calendar: &FiscalCalendar,
    threshold: Decimal,
) -> Vec<MailingEntry<'a>> {
    let prior = calendar.prior(fy);
    ledger
        .iter()
        .filter(|donor| donor.address.is_mailable())
        .filter(|donor| donor.donated_in(fy) || prior.is_some_and(|prior| donor.donated_in(prior)))
        .map(|donor| MailingEntry {
            donor,
            major: donor.is_major_donor_overall(calendar, threshold),
        })
        .collect()
}
