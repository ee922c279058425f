//! Expense/income transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bahi_core::{Money, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

/// An immutable recorded transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Counterparty (vendor for expenses, payer for income), when known.
    pub name: Option<String>,
    /// Always positive; the ledger sign convention lives in the recorder.
    pub amount: Money,
    pub category: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Transaction {
    pub const DEFAULT_CATEGORY: &'static str = "Uncategorized";
}
