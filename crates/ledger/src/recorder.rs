//! Transaction recording and summaries.
//!
//! The recorder owns the transaction log and posts the ledger side effect.
//! Sign convention (load-bearing, do not "fix"): income posts a `Payment`
//! entry with a positive amount (reduces what the party owes); an expense
//! posts an `Invoice` entry with a negated amount. Swapping either silently
//! corrupts every reachable balance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bahi_core::{DomainError, DomainResult, Money, TransactionId};

use crate::ledger::{EntryKind, LedgerStore};
use crate::transaction::{Transaction, TransactionKind};

/// Time window for summaries and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    All,
    Today,
    /// Last 7 days.
    Week,
    /// Current calendar month.
    Month,
    /// Inclusive date range.
    Range(NaiveDate, NaiveDate),
}

impl PeriodFilter {
    fn contains(&self, date: DateTime<Utc>, today: NaiveDate) -> bool {
        let d = date.date_naive();
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Today => d == today,
            PeriodFilter::Week => {
                // 7 calendar days including today.
                let start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
                d >= start && d <= today
            }
            PeriodFilter::Month => {
                d.format("%Y-%m").to_string() == today.format("%Y-%m").to_string()
            }
            PeriodFilter::Range(start, end) => d >= *start && d <= *end,
        }
    }
}

/// Expense breakdown over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total: Money,
    pub count: usize,
    /// Category → spent, highest first.
    pub by_category: Vec<(String, Money)>,
}

/// Income vs. expense totals over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
    pub transaction_count: usize,
}

/// Records transactions, maintains the log and posts ledger entries.
#[derive(Debug)]
pub struct TransactionRecorder {
    ledgers: Arc<LedgerStore>,
    log: RwLock<Vec<Transaction>>,
}

impl TransactionRecorder {
    pub fn new(ledgers: Arc<LedgerStore>) -> Self {
        Self {
            ledgers,
            log: RwLock::new(Vec::new()),
        }
    }

    /// Record a transaction whose amount has already been parsed.
    ///
    /// Date defaults to now; category defaults to "Uncategorized". If a
    /// counterparty name is present the matching ledger entry is posted in
    /// the same call.
    pub fn record(
        &self,
        kind: TransactionKind,
        name: Option<&str>,
        amount: Money,
        category: Option<&str>,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> DomainResult<Transaction> {
        if !amount.is_positive() {
            return Err(DomainError::validation("transaction amount must be positive"));
        }

        let date = match date {
            Some(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| DomainError::validation("invalid transaction date"))?,
            None => Utc::now(),
        };

        let txn = Transaction {
            id: TransactionId::new(),
            kind,
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            amount,
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(Transaction::DEFAULT_CATEGORY)
                .to_string(),
            date,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };

        if let Some(party) = &txn.name {
            let reason = category
                .or(notes)
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());
            match kind {
                // Income reduces what the party owes us.
                TransactionKind::Income => {
                    self.ledgers
                        .post(party, EntryKind::Payment, amount, reason, date);
                }
                // An expense is money owed by us, posted as a negated
                // invoice-kind entry.
                TransactionKind::Expense => {
                    self.ledgers
                        .post(party, EntryKind::Invoice, -amount, reason, date);
                }
            }
        }

        let mut log = self.log.write().unwrap_or_else(|e| e.into_inner());
        log.push(txn.clone());
        tracing::info!(
            kind = ?txn.kind,
            amount = %txn.amount,
            category = %txn.category,
            "transaction recorded"
        );
        Ok(txn)
    }

    /// Record from a raw amount string (one-shot command path).
    pub fn record_text(
        &self,
        kind: TransactionKind,
        name: Option<&str>,
        amount: &str,
        category: Option<&str>,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> DomainResult<Transaction> {
        let amount = Money::parse_rupees(amount)?;
        self.record(kind, name, amount, category, date, notes)
    }

    /// Expense breakdown over the given period.
    pub fn summarize_expenses(&self, filter: PeriodFilter) -> ExpenseSummary {
        let today = Utc::now().date_naive();
        let log = self.log.read().unwrap_or_else(|e| e.into_inner());

        let mut total = Money::zero();
        let mut count = 0;
        let mut by_category: HashMap<String, Money> = HashMap::new();
        for txn in log.iter() {
            if txn.kind != TransactionKind::Expense || !filter.contains(txn.date, today) {
                continue;
            }
            total += txn.amount;
            count += 1;
            *by_category.entry(txn.category.clone()).or_default() += txn.amount;
        }

        let mut by_category: Vec<(String, Money)> = by_category.into_iter().collect();
        by_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ExpenseSummary {
            total,
            count,
            by_category,
        }
    }

    /// Income vs. expense totals over the given period.
    pub fn report(&self, filter: PeriodFilter) -> FinancialReport {
        let today = Utc::now().date_naive();
        let log = self.log.read().unwrap_or_else(|e| e.into_inner());

        let mut income = Money::zero();
        let mut expenses = Money::zero();
        let mut transaction_count = 0;
        for txn in log.iter() {
            if !filter.contains(txn.date, today) {
                continue;
            }
            transaction_count += 1;
            match txn.kind {
                TransactionKind::Income => income += txn.amount,
                TransactionKind::Expense => expenses += txn.amount,
            }
        }

        FinancialReport {
            income,
            expenses,
            net: income - expenses,
            transaction_count,
        }
    }

    /// Snapshot of the full log (persistence support).
    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
