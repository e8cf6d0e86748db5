//! Fiscal and calendar year bookkeeping.
//!
//! The fund keeps its books on a September 1 to August 31 fiscal year. A
//! [`FiscalCalendar`] holds the configured, chronologically ordered chain of
//! fiscal years together with the calendar-year window used for tax-year
//! reporting. Year values handed out by the calendar are opaque indices, so a
//! date outside the configured window is represented as `None` rather than a
//! sentinel year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scholarship::reports::error::{FundError, Result};

/// A fiscal year within the configured chain. `None` in an
/// `Option<FiscalYear>` stands for a date that is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear(usize);

impl FiscalYear {
    /// Position of the year in the chain, oldest first.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A calendar year within the configured window. `None` stands for unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarYear(usize);

impl CalendarYear {
    /// Position of the year in the window, oldest first.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inclusive date range describing one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearRange {
    /// Display name such as `FY2025`.
    pub name: String,
    /// First day of the fiscal year.
    pub begin: NaiveDate,
    /// Last day of the fiscal year.
    pub end: NaiveDate,
}

impl FiscalYearRange {
    /// Returns true if the date falls inside the range, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.begin && date <= self.end
    }
}

/// Configured fiscal-year chain plus calendar-year window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalCalendar {
    ranges: Vec<FiscalYearRange>,
    base_year: i32,
    year_count: usize,
}

impl FiscalCalendar {
    /// Builds a calendar from chronologically ordered fiscal-year ranges and a
    /// calendar window starting at `base_year` spanning `year_count` years.
    ///
    /// The ranges must be non-empty, ordered, and gapless: each year has to
    /// begin the day after the previous one ends.
    pub fn new(ranges: Vec<FiscalYearRange>, base_year: i32, year_count: usize) -> Result<Self> {
        if ranges.is_empty() {
            return Err(FundError::InvalidConfig(
                "at least one fiscal year must be configured".into(),
            ));
        }

        for range in &ranges {
            if range.name.trim().is_empty() {
                return Err(FundError::InvalidConfig("fiscal year without a name".into()));
            }
            if range.begin > range.end {
                return Err(FundError::InvalidConfig(format!(
                    "fiscal year {} begins after it ends",
                    range.name
                )));
            }
        }

        for pair in ranges.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.end.succ_opt() != Some(next.begin) {
                return Err(FundError::InvalidConfig(format!(
                    "fiscal year {} must begin the day after {} ends",
                    next.name, previous.name
                )));
            }
        }

        Ok(Self {
            ranges,
            base_year,
            year_count,
        })
    }

    /// Maps a date to its fiscal year; `None` when the date is out of range.
    pub fn fiscal_year_of(&self, date: NaiveDate) -> Option<FiscalYear> {
        self.ranges
            .iter()
            .position(|range| range.contains(date))
            .map(FiscalYear)
    }

    /// The fiscal year before `fy`. The earliest year terminates the chain.
    pub fn prior(&self, fy: FiscalYear) -> Option<FiscalYear> {
        if fy.0 == 0 || fy.0 >= self.ranges.len() {
            None
        } else {
            Some(FiscalYear(fy.0 - 1))
        }
    }

    /// Maps a date to its calendar year; `None` when outside the window.
    pub fn calendar_year_of(&self, date: NaiveDate) -> Option<CalendarYear> {
        let offset = date.year() - self.base_year;
        if offset < 0 {
            return None;
        }
        let offset = offset as usize;
        (offset < self.year_count).then_some(CalendarYear(offset))
    }

    /// All configured fiscal years, oldest first.
    pub fn fiscal_years(&self) -> impl Iterator<Item = FiscalYear> + '_ {
        (0..self.ranges.len()).map(FiscalYear)
    }

    /// All calendar years in the window, oldest first.
    pub fn calendar_years(&self) -> impl Iterator<Item = CalendarYear> + '_ {
        (0..self.year_count).map(CalendarYear)
    }

    pub fn fiscal_year_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn calendar_year_count(&self) -> usize {
        self.year_count
    }

    /// The oldest configured fiscal year.
    pub fn earliest(&self) -> FiscalYear {
        FiscalYear(0)
    }

    /// The most recent configured fiscal year.
    pub fn latest(&self) -> FiscalYear {
        FiscalYear(self.ranges.len() - 1)
    }

    pub fn is_earliest(&self, fy: FiscalYear) -> bool {
        fy.0 == 0
    }

    /// Returns true if the fiscal year was issued by this calendar.
    pub fn is_valid(&self, fy: FiscalYear) -> bool {
        fy.0 < self.ranges.len()
    }

    /// Rejects a fiscal year this calendar never issued.
    pub fn check(&self, fy: FiscalYear) -> Result<FiscalYear> {
        if self.is_valid(fy) {
            Ok(fy)
        } else {
            Err(FundError::Invariant(format!(
                "fiscal year index {} is outside a calendar of {} years",
                fy.0,
                self.ranges.len()
            )))
        }
    }

    pub fn range(&self, fy: FiscalYear) -> Option<&FiscalYearRange> {
        self.ranges.get(fy.0)
    }

    /// Display name of a fiscal year, `"?"` for one this calendar never issued.
    pub fn name(&self, fy: FiscalYear) -> &str {
        self.ranges
            .get(fy.0)
            .map(|range| range.name.as_str())
            .unwrap_or("?")
    }

    /// The four-digit year a calendar-year value stands for.
    pub fn calendar_year_value(&self, cy: CalendarYear) -> i32 {
        self.base_year + cy.0 as i32
    }

    /// Looks up a fiscal year by its display name, ignoring case.
    pub fn find(&self, name: &str) -> Result<FiscalYear> {
        self.ranges
            .iter()
            .position(|range| range.name.eq_ignore_ascii_case(name.trim()))
            .map(FiscalYear)
            .ok_or_else(|| FundError::not_found("fiscal year", name))
    }
}
