use rust_decimal::Decimal;

use crate::scholarship::reports::calendar::{CalendarYear, FiscalCalendar, FiscalYear};
use crate::scholarship::reports::error::{FundError, Result};

/// Postal address as it appears on the fund's address list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// True when there is enough to put on an envelope.
    pub fn is_mailable(&self) -> bool {
        !self.street.is_empty() && !self.city.is_empty()
    }
}

/// A donor with running totals per fiscal year and per calendar year.
///
/// Totals start at zero and only ever grow during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Donor {
    key: String,
    name: String,
    pub address: Address,
    pub email: String,
    pub household_size: Option<u32>,
    fiscal_totals: Vec<Decimal>,
    calendar_totals: Vec<Decimal>,
}

/// Normalises a display name into the ledger key: trimmed, lower-cased,
/// inner whitespace collapsed.
pub fn donor_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Donor {
    /// Creates a donor with all totals at zero. A blank name is a broken
    /// upstream filter and is rejected as an invariant violation.
    pub fn new(name: &str, calendar: &FiscalCalendar) -> Result<Self> {
        let key = donor_key(name);
        if key.is_empty() {
            return Err(FundError::Invariant("donor name must not be empty".into()));
        }

        Ok(Self {
            key,
            name: name.split_whitespace().collect::<Vec<_>>().join(" "),
            address: Address::default(),
            email: String::new(),
            household_size: None,
            fiscal_totals: vec![Decimal::ZERO; calendar.fiscal_year_count()],
            calendar_totals: vec![Decimal::ZERO; calendar.calendar_year_count()],
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a payment to a fiscal-year total.
    pub fn add_donation(&mut self, fy: FiscalYear, amount: Decimal) -> Result<()> {
        let name = &self.name;
        let slot = self.fiscal_totals.get_mut(fy.index()).ok_or_else(|| {
            FundError::Invariant(format!(
                "fiscal year index {} outside the calendar for donor {name}",
                fy.index()
            ))
        })?;
        add_checked(slot, amount, name)
    }

    /// Adds a payment to a calendar-year total.
    pub fn add_cal_donation(&mut self, cy: CalendarYear, amount: Decimal) -> Result<()> {
        let name = &self.name;
        let slot = self.calendar_totals.get_mut(cy.index()).ok_or_else(|| {
            FundError::Invariant(format!(
                "calendar year index {} outside the window for donor {name}",
                cy.index()
            ))
        })?;
        add_checked(slot, amount, name)
    }

    /// Total given in a fiscal year.
    ///
    /// Reads do not fail: a year from some other calendar reads as zero.
    /// Writes through [`Donor::add_donation`] reject it, and report entry
    /// points validate caller-supplied years with [`FiscalCalendar::check`].
    pub fn donation(&self, fy: FiscalYear) -> Decimal {
        self.fiscal_totals
            .get(fy.index())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Total given in a calendar year, zero outside this donor's window.
    pub fn cal_donation(&self, cy: CalendarYear) -> Decimal {
        self.calendar_totals
            .get(cy.index())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn donated_in(&self, fy: FiscalYear) -> bool {
        self.donation(fy) > Decimal::ZERO
    }

    /// Sum over every configured fiscal year.
    pub fn total(&self) -> Decimal {
        self.fiscal_totals.iter().copied().sum()
    }

    pub fn is_major_donor(&self, fy: FiscalYear, threshold: Decimal) -> bool {
        self.donation(fy) >= threshold
    }

    /// Major donor in at least one configured fiscal year.
    pub fn is_major_donor_overall(&self, calendar: &FiscalCalendar, threshold: Decimal) -> bool {
        calendar
            .fiscal_years()
            .any(|fy| self.is_major_donor(fy, threshold))
    }

    /// Gave in the year before `fy` but not in `fy`.
    ///
    /// The earliest configured year has nothing to compare against and
    /// always answers true.
    pub fn is_non_repeat_donor(&self, fy: FiscalYear, calendar: &FiscalCalendar) -> bool {
        match calendar.prior(fy) {
            None => calendar.is_earliest(fy),
            Some(prior) => self.donated_in(prior) && !self.donated_in(fy),
        }
    }
}

fn add_checked(slot: &mut Decimal, amount: Decimal, name: &str) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FundError::Invariant(format!(
            "negative donation {amount} for donor {name}"
        )));
    }
    *slot += amount;
    Ok(())
}
