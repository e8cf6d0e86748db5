//! Business constants the reports depend on.
//!
//! Every value has a built-in default matching the fund's current books, and
//! any of them can be overridden from a TOML file:
//!
//! ```toml
//! major_donor_threshold = 2000
//! excluded_payees = ["Bank Interest"]
//!
//! [calendar_years]
//! base = 2023
//! count = 4
//!
//! [[fiscal_years]]
//! name = "FY2024"
//! begin = "2023-09-01"
//! end = "2024-08-31"
//!
//! [grants]
//! bill_amount_column = "Amount"
//!
//! [grants.payment_types]
//! "Bill Payment" = "grant-payment"
//! ```
//!
//! Dates are quoted ISO strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYearRange};
use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::grants::TransactionKind;
use crate::scholarship::reports::grants::awards::{AwardGroup, AwardGroups};
use crate::scholarship::reports::io::columns;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FundConfig {
    /// A fiscal-year total at or above this amount makes a major donor.
    pub major_donor_threshold: Decimal,
    /// Payees that never count as donors (interest, internal transfers).
    pub excluded_payees: Vec<String>,
    /// Values of the payment `Type` column that count as donations. Empty
    /// accepts every row.
    pub donation_types: Vec<String>,
    pub calendar_years: CalendarWindow,
    /// Fiscal years, oldest first.
    pub fiscal_years: Vec<FiscalYearRange>,
    pub grants: GrantRules,
    /// Award cycles, oldest first.
    pub award_groups: Vec<AwardGroupConfig>,
}

/// Calendar-year window used for tax-year totals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarWindow {
    pub base: i32,
    pub count: usize,
}

/// Routing rules turning bill and payment rows into grant transactions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrantRules {
    /// Bill types booked as a new grant.
    pub grant_bill_types: Vec<String>,
    /// Bill types booked as a transfer between institutions.
    pub transfer_bill_types: Vec<String>,
    /// Vendors or memo names that are not scholarship related.
    pub excluded_names: Vec<String>,
    /// Payment `Type` column value to transaction kind.
    pub payment_types: BTreeMap<String, TransactionKind>,
    /// Heading of the billed-amount column in the bill export.
    pub bill_amount_column: String,
}

/// One award cycle as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwardGroupConfig {
    pub name: String,
    pub award_date: NaiveDate,
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl FundConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FundConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Builds the validated fiscal calendar.
    pub fn calendar(&self) -> Result<FiscalCalendar> {
        FiscalCalendar::new(
            self.fiscal_years.clone(),
            self.calendar_years.base,
            self.calendar_years.count,
        )
    }

    /// Builds the validated award-group resolver.
    pub fn award_groups(&self) -> Result<AwardGroups> {
        let groups = self
            .award_groups
            .iter()
            .map(|group| AwardGroup::new(&group.name, group.award_date, group.begin, group.end))
            .collect::<Result<Vec<_>>>()?;
        AwardGroups::new(groups)
    }

    /// Returns true if the payee is on the excluded list, ignoring case.
    pub fn is_excluded_payee(&self, payee: &str) -> bool {
        contains_ignore_case(&self.excluded_payees, payee)
    }

    /// Returns true if the payment row type counts as a donation.
    pub fn is_donation_type(&self, row_type: &str) -> bool {
        self.donation_types.is_empty() || contains_ignore_case(&self.donation_types, row_type)
    }
}

impl GrantRules {
    pub fn is_excluded(&self, name: &str) -> bool {
        !name.trim().is_empty() && contains_ignore_case(&self.excluded_names, name)
    }

    /// Routes a bill type to grant or transfer.
    pub fn bill_kind(&self, bill_type: &str) -> Result<TransactionKind> {
        if contains_ignore_case(&self.grant_bill_types, bill_type) {
            Ok(TransactionKind::Grant)
        } else if contains_ignore_case(&self.transfer_bill_types, bill_type) {
            Ok(TransactionKind::Transfer)
        } else {
            Err(FundError::Invariant(format!(
                "bill type '{bill_type}' is neither a grant nor a transfer"
            )))
        }
    }

    /// Routes a payment row type through the configured mapping.
    pub fn payment_kind(&self, row_type: &str) -> Result<TransactionKind> {
        let wanted = row_type.trim();
        self.payment_types
            .iter()
            .find(|(label, _)| label.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, kind)| *kind)
            .ok_or_else(|| {
                FundError::Invariant(format!("payment type '{row_type}' has no transaction kind"))
            })
    }
}

pub(crate) fn contains_ignore_case(list: &[String], value: &str) -> bool {
    let value = value.trim();
    list.iter().any(|entry| entry.trim().eq_ignore_ascii_case(value))
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            major_donor_threshold: Decimal::from(2000),
            excluded_payees: vec!["Bank Interest".to_string()],
            donation_types: vec!["Payment".to_string(), "Sales Receipt".to_string()],
            calendar_years: CalendarWindow::default(),
            fiscal_years: (2024..=2026)
                .map(|year| FiscalYearRange {
                    name: format!("FY{year}"),
                    begin: date(year - 1, 9, 1),
                    end: date(year, 8, 31),
                })
                .collect(),
            grants: GrantRules::default(),
            award_groups: (2023..=2025)
                .flat_map(|year| {
                    [
                        AwardGroupConfig {
                            name: format!("Fall {year}"),
                            award_date: date(year, 8, 1),
                            begin: date(year, 6, 1),
                            end: date(year, 11, 30),
                        },
                        AwardGroupConfig {
                            name: format!("Spring {}", year + 1),
                            award_date: date(year, 12, 15),
                            begin: date(year, 12, 1),
                            end: date(year + 1, 5, 31),
                        },
                    ]
                })
                .collect(),
        }
    }
}

impl Default for CalendarWindow {
    fn default() -> Self {
        Self {
            base: 2023,
            count: 4,
        }
    }
}

impl Default for GrantRules {
    fn default() -> Self {
        let payment_types = [
            ("Bill Payment", TransactionKind::GrantPayment),
            ("Check", TransactionKind::GrantPayment),
            ("Write Off", TransactionKind::WriteOff),
            ("Refund", TransactionKind::Refund),
        ]
        .into_iter()
        .map(|(label, kind)| (label.to_string(), kind))
        .collect();

        Self {
            grant_bill_types: vec!["Scholarship".to_string(), "Grant".to_string()],
            transfer_bill_types: vec!["Transfer".to_string()],
            excluded_names: vec!["Internal Revenue Service".to_string()],
            payment_types,
            bill_amount_column: columns::BILL_AMOUNT.to_string(),
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
