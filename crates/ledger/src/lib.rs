//! Per-party running ledgers and the expense/income transaction log.
//!
//! A `Ledger` is an append-only list of signed entries plus a running balance
//! maintained on every append (never recomputed lazily on the read path).
//! Positive balance = receivable from that party, negative = payable to them.

pub mod ledger;
pub mod recorder;
pub mod transaction;

pub use ledger::{EntryKind, Ledger, LedgerEntry, LedgerStore};
pub use recorder::{ExpenseSummary, FinancialReport, PeriodFilter, TransactionRecorder};
pub use transaction::{Transaction, TransactionKind};
