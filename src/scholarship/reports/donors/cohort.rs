//! Donation-recency cohorts.
//!
//! For a target fiscal year a donor lands in at most one cohort, decided by
//! the first matching rule:
//!
//! 1. gave the year before: [`Cohort::PriorYear`] (retained),
//! 2. gave two years before: [`Cohort::PriorPriorYear`] (reactivated),
//! 3. gave in the target year: [`Cohort::CurrentYear`] (new or reacquired).
//!
//! Rules 1 and 2 do not look at the target year, so a retained donor who has
//! not given yet is counted with a zero amount.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::donors::donor::Donor;
use crate::scholarship::reports::donors::ledger::DonorLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cohort {
    CurrentYear,
    PriorYear,
    PriorPriorYear,
}

impl Cohort {
    pub const ALL: [Cohort; 3] = [Cohort::CurrentYear, Cohort::PriorYear, Cohort::PriorPriorYear];

    fn index(self) -> usize {
        match self {
            Cohort::CurrentYear => 0,
            Cohort::PriorYear => 1,
            Cohort::PriorPriorYear => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cohort::CurrentYear => "New",
            Cohort::PriorYear => "Retained",
            Cohort::PriorPriorYear => "Reactivated",
        }
    }
}

/// Places a donor in a cohort for `fy`, or `None` when no rule matches.
pub fn classify(donor: &Donor, fy: FiscalYear, calendar: &FiscalCalendar) -> Option<Cohort> {
    let prior = calendar.prior(fy);
    if prior.is_some_and(|prior| donor.donated_in(prior)) {
        return Some(Cohort::PriorYear);
    }
    if prior
        .and_then(|prior| calendar.prior(prior))
        .is_some_and(|prior_prior| donor.donated_in(prior_prior))
    {
        return Some(Cohort::PriorPriorYear);
    }
    donor.donated_in(fy).then_some(Cohort::CurrentYear)
}

/// `round(sum / count)`, zero for an empty cohort.
pub fn average(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    round_whole(sum / Decimal::from(count))
}

/// `round(100 * (current - prior) / prior)`, zero when there is no prior.
pub fn percent_change(current: Decimal, prior: Decimal) -> Decimal {
    if prior.is_zero() {
        return Decimal::ZERO;
    }
    round_whole(Decimal::ONE_HUNDRED * (current - prior) / prior)
}

/// `round(100 * part / whole)`, zero when the whole is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_whole(Decimal::ONE_HUNDRED * part / whole)
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Cohort counts and sums for one fiscal year.
#[derive(Debug, Clone, PartialEq)]
pub struct FiscalYearCohorts {
    pub fiscal_year: FiscalYear,
    pub name: String,
    counts: [usize; 3],
    sums: [Decimal; 3],
    /// Change of the overall average gift against the prior fiscal year.
    pub percent_change: Decimal,
}

impl FiscalYearCohorts {
    fn new(fiscal_year: FiscalYear, name: &str) -> Self {
        Self {
            fiscal_year,
            name: name.to_string(),
            counts: [0; 3],
            sums: [Decimal::ZERO; 3],
            percent_change: Decimal::ZERO,
        }
    }

    fn record(&mut self, cohort: Cohort, amount: Decimal) {
        self.counts[cohort.index()] += 1;
        self.sums[cohort.index()] += amount;
    }

    pub fn count(&self, cohort: Cohort) -> usize {
        self.counts[cohort.index()]
    }

    pub fn sum(&self, cohort: Cohort) -> Decimal {
        self.sums[cohort.index()]
    }

    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn total_amount(&self) -> Decimal {
        self.sums.iter().copied().sum()
    }

    pub fn average(&self, cohort: Cohort) -> Decimal {
        average(self.sum(cohort), self.count(cohort))
    }

    /// Average gift across all cohorts.
    pub fn overall_average(&self) -> Decimal {
        average(self.total_amount(), self.total_count())
    }
}

/// Cohort statistics for every configured fiscal year, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortSummary {
    pub years: Vec<FiscalYearCohorts>,
}

impl CohortSummary {
    pub fn build(ledger: &DonorLedger, calendar: &FiscalCalendar) -> Self {
        let mut years: Vec<FiscalYearCohorts> = calendar
            .fiscal_years()
            .map(|fy| FiscalYearCohorts::new(fy, calendar.name(fy)))
            .collect();

        for donor in ledger.iter() {
            for year in years.iter_mut() {
                if let Some(cohort) = classify(donor, year.fiscal_year, calendar) {
                    year.record(cohort, donor.donation(year.fiscal_year));
                }
            }
        }

        for index in 1..years.len() {
            let prior_average = years[index - 1].overall_average();
            let current_average = years[index].overall_average();
            years[index].percent_change = percent_change(current_average, prior_average);
        }

        Self { years }
    }

    pub fn get(&self, fy: FiscalYear) -> Option<&FiscalYearCohorts> {
        self.years.iter().find(|year| year.fiscal_year == fy)
    }
}
