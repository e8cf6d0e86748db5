use rust_decimal::Decimal;

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::donors::cohort::{average, percent_change, percent_of};
use crate::scholarship::reports::donors::donor::Donor;
use crate::scholarship::reports::donors::ledger::DonorLedger;

/// Major-donor statistics for one fiscal year. Unlike the cohorts these are
/// partitioned strictly by year.
#[derive(Debug, Clone, PartialEq)]
pub struct MajorDonorYear {
    pub fiscal_year: FiscalYear,
    pub name: String,
    pub count: usize,
    pub total: Decimal,
    pub average: Decimal,
    /// Share of the year's donations, all donors included.
    pub percent_of_total: Decimal,
    /// Change of `average` against the prior fiscal year.
    pub percent_change: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MajorDonorSummary {
    pub threshold: Decimal,
    pub years: Vec<MajorDonorYear>,
}

impl MajorDonorSummary {
    pub fn build(ledger: &DonorLedger, calendar: &FiscalCalendar, threshold: Decimal) -> Self {
        let mut years: Vec<MajorDonorYear> = Vec::with_capacity(calendar.fiscal_year_count());

        for fy in calendar.fiscal_years() {
            let mut count = 0;
            let mut total = Decimal::ZERO;
            let mut all_donors = Decimal::ZERO;

            for donor in ledger.iter() {
                let donation = donor.donation(fy);
                all_donors += donation;
                if is_major(donor, fy, threshold) {
                    count += 1;
                    total += donation;
                }
            }

            let average = average(total, count);
            let prior_average = calendar
                .prior(fy)
                .and_then(|prior| years.get(prior.index()))
                .map_or(Decimal::ZERO, |prior: &MajorDonorYear| prior.average);

            years.push(MajorDonorYear {
                fiscal_year: fy,
                name: calendar.name(fy).to_string(),
                count,
                total,
                average,
                percent_of_total: percent_of(total, all_donors),
                percent_change: percent_change(average, prior_average),
            });
        }

        Self { threshold, years }
    }

    pub fn get(&self, fy: FiscalYear) -> Option<&MajorDonorYear> {
        self.years.iter().find(|year| year.fiscal_year == fy)
    }
}

/// Major donors of `fy`, largest gift first, ties by name.
pub fn major_donors(ledger: &DonorLedger, fy: FiscalYear, threshold: Decimal) -> Vec<&Donor> {
    let mut donors: Vec<&Donor> = ledger
        .iter()
        .filter(|donor| is_major(donor, fy, threshold))
        .collect();
    donors.sort_by(|lhs, rhs| {
        rhs.donation(fy)
            .cmp(&lhs.donation(fy))
            .then_with(|| lhs.key().cmp(rhs.key()))
    });
    donors
}

fn is_major(donor: &Donor, fy: FiscalYear, threshold: Decimal) -> bool {
    donor.donated_in(fy) && donor.is_major_donor(fy, threshold)
}
