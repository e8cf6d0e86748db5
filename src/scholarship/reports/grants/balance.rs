use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::scholarship::reports::calendar::{FiscalCalendar, FiscalYear};
use crate::scholarship::reports::grants::{GrantLedger, RecipientId, Transaction, TransactionKind};

/// A transaction in ledger order with the recipient's balance after it.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceLine<'a> {
    pub transaction: &'a Transaction,
    pub balance: Decimal,
    /// Last line of this recipient; `balance` is then the amount outstanding.
    pub closes_recipient: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipientBalance {
    pub recipient: RecipientId,
    pub name: String,
    pub balance: Decimal,
}

/// Amount per transaction kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTotals {
    amounts: [Decimal; 5],
}

impl KindTotals {
    pub fn add(&mut self, kind: TransactionKind, amount: Decimal) {
        self.amounts[kind.rank()] += amount;
    }

    pub fn amount(&self, kind: TransactionKind) -> Decimal {
        self.amounts[kind.rank()]
    }

    pub fn write_offs(&self) -> Decimal {
        self.amount(TransactionKind::WriteOff)
    }

    /// Grants, transfers and refunds less payments and write-offs.
    pub fn net_balance(&self) -> Decimal {
        TransactionKind::ALL
            .into_iter()
            .map(|kind| kind.sign() * self.amount(kind))
            .sum()
    }

    fn merge(&mut self, other: &KindTotals) {
        for kind in TransactionKind::ALL {
            self.add(kind, other.amount(kind));
        }
    }
}

/// Per fiscal year and overall sums by transaction kind.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantTotals {
    /// One entry per configured fiscal year, oldest first.
    pub years: Vec<(FiscalYear, KindTotals)>,
    /// Transactions dated outside every configured fiscal year.
    pub out_of_range: KindTotals,
    pub overall: KindTotals,
}

impl GrantTotals {
    pub fn get(&self, fy: FiscalYear) -> Option<&KindTotals> {
        self.years
            .iter()
            .find(|(year, _)| *year == fy)
            .map(|(_, totals)| totals)
    }
}

/// Grant payments to one recipient, per fiscal year.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientSum {
    pub recipient: RecipientId,
    pub name: String,
    /// Indexed by fiscal year, oldest first.
    pub per_year: Vec<Decimal>,
}

impl RecipientSum {
    /// Paid in `fy`; zero for a year outside the calendar the sums were
    /// built with.
    pub fn paid(&self, fy: FiscalYear) -> Decimal {
        self.per_year
            .get(fy.index())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.per_year.iter().copied().sum()
    }
}

impl GrantLedger {
    /// Transactions ordered by recipient name, date, then kind rank. Entries
    /// that tie on all three keep their booking order.
    pub fn sorted(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|lhs, rhs| self.ledger_order(lhs, rhs));
        sorted
    }

    fn ledger_order(&self, lhs: &Transaction, rhs: &Transaction) -> Ordering {
        let lhs_name = self.recipient(lhs.recipient).to_lowercase();
        let rhs_name = self.recipient(rhs.recipient).to_lowercase();
        lhs_name
            .cmp(&rhs_name)
            .then_with(|| lhs.date.cmp(&rhs.date))
            .then_with(|| lhs.kind.rank().cmp(&rhs.kind.rank()))
    }

    /// Walks the sorted ledger carrying a running balance per recipient,
    /// reset to zero whenever the recipient changes.
    pub fn balances(&self) -> Vec<BalanceLine<'_>> {
        let sorted = self.sorted();
        let mut lines: Vec<BalanceLine<'_>> = Vec::with_capacity(sorted.len());
        let mut balance = Decimal::ZERO;

        for (position, transaction) in sorted.iter().enumerate() {
            if position > 0 && sorted[position - 1].recipient != transaction.recipient {
                balance = Decimal::ZERO;
            }
            balance += transaction.signed_amount();

            let closes_recipient = sorted
                .get(position + 1)
                .is_none_or(|next| next.recipient != transaction.recipient);
            lines.push(BalanceLine {
                transaction,
                balance,
                closes_recipient,
            });
        }

        lines
    }

    /// Final balance of every recipient, in ledger order.
    pub fn outstanding_balances(&self) -> Vec<RecipientBalance> {
        self.balances()
            .into_iter()
            .filter(|line| line.closes_recipient)
            .map(|line| RecipientBalance {
                recipient: line.transaction.recipient,
                name: self.recipient(line.transaction.recipient).to_string(),
                balance: line.balance,
            })
            .collect()
    }

    pub fn totals(&self, calendar: &FiscalCalendar) -> GrantTotals {
        let mut years: Vec<(FiscalYear, KindTotals)> = calendar
            .fiscal_years()
            .map(|fy| (fy, KindTotals::default()))
            .collect();
        let mut out_of_range = KindTotals::default();

        for transaction in &self.transactions {
            let bucket = transaction
                .fiscal_year
                .and_then(|fy| years.get_mut(fy.index()))
                .map(|(_, totals)| totals)
                .unwrap_or(&mut out_of_range);
            bucket.add(transaction.kind, transaction.amount);
        }

        let mut overall = out_of_range;
        for (_, totals) in &years {
            overall.merge(totals);
        }

        GrantTotals {
            years,
            out_of_range,
            overall,
        }
    }

    /// Grant payments per recipient and fiscal year, recipients in name order.
    pub fn recipient_payments(&self, calendar: &FiscalCalendar) -> Vec<RecipientSum> {
        let mut sums: Vec<RecipientSum> = Vec::new();

        for transaction in self.sorted() {
            if transaction.kind != TransactionKind::GrantPayment
                || transaction.amount.is_sign_negative()
            {
                continue;
            }
            let Some(fy) = transaction.fiscal_year else {
                continue;
            };

            if sums
                .last()
                .is_none_or(|last| last.recipient != transaction.recipient)
            {
                sums.push(RecipientSum {
                    recipient: transaction.recipient,
                    name: self.recipient(transaction.recipient).to_string(),
                    per_year: vec![Decimal::ZERO; calendar.fiscal_year_count()],
                });
            }
            if let Some(slot) = sums
                .last_mut()
                .and_then(|sum| sum.per_year.get_mut(fy.index()))
            {
                *slot += transaction.amount;
            }
        }

        sums
    }
}
