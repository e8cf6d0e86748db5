//! Scholarship grant ledger.
//!
//! Bills booked against an institution on behalf of a student create or move
//! an obligation; payments, write-offs and refunds settle it. The ledger keeps
//! the flat transaction list, and [`balance`] derives running balances and
//! totals from it.

pub mod awards;
pub mod balance;

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::config::GrantRules;
use crate::scholarship::reports::error::{FundError, Result};
use crate::scholarship::reports::io::columns;
use crate::scholarship::reports::io::table::TableSource;

pub use awards::{AwardGroup, AwardGroups, AwardMiss};
pub use balance::{BalanceLine, GrantTotals, KindTotals, RecipientBalance, RecipientSum};

/// The closed set of grant ledger entries.
///
/// Declaration order is the tie-break rank used when two entries for the same
/// recipient share a date: obligations are applied before settlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Grant,
    Transfer,
    Refund,
    GrantPayment,
    WriteOff,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 5] = [
        TransactionKind::Grant,
        TransactionKind::Transfer,
        TransactionKind::Refund,
        TransactionKind::GrantPayment,
        TransactionKind::WriteOff,
    ];

    /// Direction the entry moves the recipient's balance.
    pub fn sign(self) -> Decimal {
        match self {
            TransactionKind::Grant | TransactionKind::Transfer | TransactionKind::Refund => {
                Decimal::ONE
            }
            TransactionKind::GrantPayment | TransactionKind::WriteOff => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Grant => "Grant",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::Refund => "Refund",
            TransactionKind::GrantPayment => "Grant Payment",
            TransactionKind::WriteOff => "Write Off",
        }
    }

    /// Parses a label as produced by [`TransactionKind::label`] or its
    /// kebab-case spelling. Anything else means the classification upstream
    /// is broken.
    pub fn parse(label: &str) -> Result<Self> {
        let wanted = label.trim().replace('-', " ");
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| FundError::Invariant(format!("unknown transaction type '{label}'")))
    }
}

/// Interned scholarship recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecipientId(usize);

/// Interned educational institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstitutionId(usize);

#[derive(Debug, Clone, Default)]
struct Interner {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> usize {
        let display = name.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = display.to_lowercase();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.names.len();
        self.names.push(display);
        self.index.insert(key, id);
        id
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        let key = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        self.index.get(&key).copied()
    }

    fn name(&self, id: usize) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or("")
    }
}

/// Name tables for recipients and institutions. The first occurrence of a
/// name creates the entry; later occurrences resolve to the same id, so ids
/// compare by identity.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    recipients: Interner,
    institutions: Interner,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_recipient(&mut self, name: &str) -> RecipientId {
        RecipientId(self.recipients.intern(name))
    }

    pub fn intern_institution(&mut self, name: &str) -> InstitutionId {
        InstitutionId(self.institutions.intern(name))
    }

    pub fn recipient_name(&self, id: RecipientId) -> &str {
        self.recipients.name(id.0)
    }

    pub fn institution_name(&self, id: InstitutionId) -> &str {
        self.institutions.name(id.0)
    }

    pub fn find_recipient(&self, name: &str) -> Result<RecipientId> {
        self.recipients
            .lookup(name)
            .map(RecipientId)
            .ok_or_else(|| FundError::not_found("recipient", name))
    }

    pub fn find_institution(&self, name: &str) -> Result<InstitutionId> {
        self.institutions
            .lookup(name)
            .map(InstitutionId)
            .ok_or_else(|| FundError::not_found("institution", name))
    }

    pub fn recipient_count(&self) -> usize {
        self.recipients.names.len()
    }
}

/// One grant ledger entry. The amount is never negative; direction comes
/// from [`TransactionKind::sign`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub recipient: RecipientId,
    pub institution: InstitutionId,
    pub fiscal_year: Option<FiscalYear>,
    pub amount: Decimal,
    pub memo: String,
}

impl Transaction {
    /// Amount with the kind's sign applied.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.sign() * self.amount
    }
}

/// Row accounting for one bill or payment ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantIngestSummary {
    pub rows: usize,
    pub accepted: usize,
    /// Rows naming a vendor or person on the exclusion list.
    pub excluded: usize,
    /// Blank rows and rows without an amount.
    pub skipped: usize,
}

/// Entry to be booked through [`GrantLedger::record`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction<'a> {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub recipient: &'a str,
    pub institution: &'a str,
    pub amount: Decimal,
    pub memo: &'a str,
}

/// Sequential list of grant transactions plus the registry resolving their
/// recipient and institution references.
#[derive(Debug, Clone, Default)]
pub struct GrantLedger {
    registry: Registry,
    transactions: Vec<Transaction>,
}

impl GrantLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a ledger that shares names already interned elsewhere.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            transactions: Vec::new(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn recipient(&self, id: RecipientId) -> &str {
        self.registry.recipient_name(id)
    }

    pub fn institution(&self, id: InstitutionId) -> &str {
        self.registry.institution_name(id)
    }

    pub fn find_recipient(&self, name: &str) -> Result<RecipientId> {
        self.registry.find_recipient(name)
    }

    /// Books a transaction, resolving names through the registry and dating
    /// it into the fiscal calendar.
    pub fn record(&mut self, entry: NewTransaction<'_>, calendar: &FiscalCalendar) -> Result<()> {
        if entry.amount.is_sign_negative() && !entry.amount.is_zero() {
            return Err(FundError::Invariant(format!(
                "negative {} amount {} for {}",
                entry.kind.label(),
                entry.amount,
                entry.recipient
            )));
        }
        if entry.recipient.trim().is_empty() {
            return Err(FundError::Invariant(format!(
                "{} on {} has no recipient",
                entry.kind.label(),
                entry.date
            )));
        }

        let recipient = self.registry.intern_recipient(entry.recipient);
        let institution = self.registry.intern_institution(entry.institution);
        self.transactions.push(Transaction {
            date: entry.date,
            kind: entry.kind,
            recipient,
            institution,
            fiscal_year: calendar.fiscal_year_of(entry.date),
            amount: entry.amount,
            memo: entry.memo.to_string(),
        });
        Ok(())
    }

    /// Books the bill export. The vendor is the institution and the memo
    /// names the student; the bill type decides between grant and transfer.
    pub fn ingest_bills<S: TableSource>(
        &mut self,
        source: &S,
        calendar: &FiscalCalendar,
        rules: &GrantRules,
    ) -> Result<GrantIngestSummary> {
        let mut summary = GrantIngestSummary::default();

        for row in source.data_rows() {
            summary.rows += 1;

            let vendor = source.cell(row, columns::VENDOR)?;
            let memo = source.cell(row, columns::MEMO)?;
            if vendor.is_empty() && memo.is_empty() {
                summary.skipped += 1;
                continue;
            }
            if rules.is_excluded(&vendor) || rules.is_excluded(&memo) {
                debug!(row, vendor = %vendor, "bill for excluded name dropped");
                summary.excluded += 1;
                continue;
            }

            let Some(amount) = source.cell_as_decimal(row, &rules.bill_amount_column)? else {
                summary.skipped += 1;
                continue;
            };
            let kind = rules.bill_kind(&source.cell(row, columns::TYPE)?)?;
            let date = required_date(source, row, columns::BILL_DATE)?;
            if memo.is_empty() {
                return Err(FundError::not_found("recipient", format!("bill row {row}")));
            }

            self.record(
                NewTransaction {
                    date,
                    kind,
                    recipient: &memo,
                    institution: &vendor,
                    amount,
                    memo: &memo,
                },
                calendar,
            )?;
            summary.accepted += 1;
        }

        info!(
            rows = summary.rows,
            accepted = summary.accepted,
            excluded = summary.excluded,
            "ingested grant bills"
        );
        Ok(summary)
    }

    /// Books the payment export: checks to institutions, write-offs and
    /// refunds. Bank registers show money out as negative, so the magnitude
    /// is booked and the kind carries the direction.
    pub fn ingest_payments<S: TableSource>(
        &mut self,
        source: &S,
        calendar: &FiscalCalendar,
        rules: &GrantRules,
    ) -> Result<GrantIngestSummary> {
        let mut summary = GrantIngestSummary::default();

        for row in source.data_rows() {
            summary.rows += 1;

            let payee = source.cell(row, columns::PAYEE)?;
            let memo = source.cell(row, columns::MEMO)?;
            if payee.is_empty() && memo.is_empty() {
                summary.skipped += 1;
                continue;
            }
            if rules.is_excluded(&payee) || rules.is_excluded(&memo) {
                debug!(row, payee = %payee, "payment for excluded name dropped");
                summary.excluded += 1;
                continue;
            }

            let Some(amount) = source.cell_as_decimal(row, columns::PAYMENT)? else {
                summary.skipped += 1;
                continue;
            };
            let kind = rules.payment_kind(&source.cell(row, columns::TYPE)?)?;
            let date = required_date(source, row, columns::DATE)?;
            if memo.is_empty() {
                return Err(FundError::not_found("recipient", format!("payment row {row}")));
            }

            self.record(
                NewTransaction {
                    date,
                    kind,
                    recipient: &memo,
                    institution: &payee,
                    amount: amount.abs(),
                    memo: &memo,
                },
                calendar,
            )?;
            summary.accepted += 1;
        }

        info!(
            rows = summary.rows,
            accepted = summary.accepted,
            excluded = summary.excluded,
            "ingested grant payments"
        );
        Ok(summary)
    }
}

fn required_date<S: TableSource>(source: &S, row: usize, column: &str) -> Result<NaiveDate> {
    source
        .cell_as_date(row, column)?
        .ok_or_else(|| FundError::InvalidDate {
            row,
            column: column.to_string(),
            value: String::new(),
        })
}
