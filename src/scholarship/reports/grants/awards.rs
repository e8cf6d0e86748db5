//! Scholarship award cycles.
//!
//! Each award group is a named, contiguous date range around the day awards
//! are announced. Bills are attributed to the group whose range contains the
//! bill date; the groups never overlap, so at most one matches.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::grants::{GrantLedger, TransactionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardGroup {
    name: String,
    award_date: NaiveDate,
    begin: NaiveDate,
    end: NaiveDate,
    count: usize,
}

impl AwardGroup {
    /// The award date has to fall within the group's own range.
    pub fn new(name: &str, award_date: NaiveDate, begin: NaiveDate, end: NaiveDate) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(FundError::InvalidConfig("award group without a name".into()));
        }
        if begin > end {
            return Err(FundError::InvalidConfig(format!(
                "award group {name} begins after it ends"
            )));
        }
        if award_date < begin || award_date > end {
            return Err(FundError::InvalidConfig(format!(
                "award date {award_date} of {name} lies outside {begin}..={end}"
            )));
        }

        Ok(Self {
            name: name.trim().to_string(),
            award_date,
            begin,
            end,
            count: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn award_date(&self) -> NaiveDate {
        self.award_date
    }

    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.begin && date <= self.end
    }

    pub fn add_bill(&mut self) {
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// A grant bill whose date fell in no award group.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardMiss {
    pub date: NaiveDate,
    pub recipient: String,
    pub amount: Decimal,
}

/// Chronologically ordered, non-overlapping award groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardGroups {
    groups: Vec<AwardGroup>,
}

impl AwardGroups {
    pub fn new(groups: Vec<AwardGroup>) -> Result<Self> {
        for pair in groups.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.begin <= previous.end {
                return Err(FundError::InvalidConfig(format!(
                    "award group {} must start after {} ends",
                    next.name, previous.name
                )));
            }
        }
        Ok(Self { groups })
    }

    /// First group whose range contains the date.
    pub fn find(&self, date: NaiveDate) -> Result<&AwardGroup> {
        self.groups
            .iter()
            .find(|group| group.contains(date))
            .ok_or_else(|| FundError::not_found("award group", date.to_string()))
    }

    pub fn find_mut(&mut self, date: NaiveDate) -> Result<&mut AwardGroup> {
        self.groups
            .iter_mut()
            .find(|group| group.contains(date))
            .ok_or_else(|| FundError::not_found("award group", date.to_string()))
    }

    pub fn groups(&self) -> &[AwardGroup] {
        &self.groups
    }

    /// Counts every grant bill of the ledger into its award group. Bills that
    /// match no group are returned so the caller can decide whether to skip
    /// them or abort.
    pub fn tally(&mut self, ledger: &GrantLedger) -> Vec<AwardMiss> {
        let mut misses = Vec::new();

        for transaction in ledger.transactions() {
            if transaction.kind != TransactionKind::Grant {
                continue;
            }
            match self.find_mut(transaction.date) {
                Ok(group) => group.add_bill(),
                Err(error) => {
                    let recipient = ledger.recipient(transaction.recipient).to_string();
                    warn!(%error, recipient = %recipient, "bill outside every award group");
                    misses.push(AwardMiss {
                        date: transaction.date,
                        recipient,
                        amount: transaction.amount,
                    });
                }
            }
        }

        info!(
            groups = self.groups.len(),
            unmatched = misses.len(),
            "tallied bills into award groups"
        );
        misses
    }
}
