//! Persistence sinks for completed records.
//!
//! The assistant calls a sink after every completed invoice or transaction.
//! Sinks are fire-and-forget from the conversation's point of view: a failed
//! write surfaces as a generic failure message and is never retried.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

use bahi_core::{DomainError, DomainResult};
use bahi_invoicing::Invoice;
use bahi_ledger::{Ledger, Transaction};

/// Where completed records go.
pub trait RecordSink: Send + Sync {
    fn append_invoice(&self, invoice: &Invoice) -> DomainResult<()>;
    fn append_transaction(&self, txn: &Transaction) -> DomainResult<()>;
    /// Full-state write: ledgers are small and mutate on every post, so the
    /// whole snapshot is rewritten rather than diffed.
    fn write_ledgers(&self, ledgers: &[Ledger]) -> DomainResult<()>;
}

/// Keeps everything in memory. Used in tests and as the default sink.
#[derive(Debug, Default)]
pub struct InMemorySink {
    invoices: Mutex<Vec<Invoice>>,
    transactions: Mutex<Vec<Transaction>>,
    ledgers: Mutex<Vec<Ledger>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn ledgers(&self) -> Vec<Ledger> {
        self.ledgers.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RecordSink for InMemorySink {
    fn append_invoice(&self, invoice: &Invoice) -> DomainResult<()> {
        self.invoices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(invoice.clone());
        Ok(())
    }

    fn append_transaction(&self, txn: &Transaction) -> DomainResult<()> {
        self.transactions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(txn.clone());
        Ok(())
    }

    fn write_ledgers(&self, ledgers: &[Ledger]) -> DomainResult<()> {
        *self.ledgers.lock().unwrap_or_else(|e| e.into_inner()) = ledgers.to_vec();
        Ok(())
    }
}

/// JSON files under a data directory: `invoices.json`, `transactions.json`
/// and `ledgers.json`. Appends read-modify-write the whole array; the files
/// stay human-readable and small at single-business scale.
#[derive(Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub const INVOICES_FILE: &'static str = "invoices.json";
    pub const TRANSACTIONS_FILE: &'static str = "transactions.json";
    pub const LEDGERS_FILE: &'static str = "ledgers.json";

    pub fn new(dir: impl Into<PathBuf>) -> DomainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| DomainError::storage(format!("creating {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn append<T: Serialize>(&self, file: &str, record: &T) -> DomainResult<()> {
        let path = self.dir.join(file);
        let mut records: Vec<serde_json::Value> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| DomainError::storage(format!("parsing {file}: {e}")))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DomainError::storage(format!("reading {file}: {e}"))),
        };
        records.push(
            serde_json::to_value(record)
                .map_err(|e| DomainError::storage(format!("encoding {file}: {e}")))?,
        );
        self.write(file, &records)
    }

    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> DomainResult<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| DomainError::storage(format!("encoding {file}: {e}")))?;
        fs::write(self.dir.join(file), text)
            .map_err(|e| DomainError::storage(format!("writing {file}: {e}")))
    }
}

impl RecordSink for JsonFileSink {
    fn append_invoice(&self, invoice: &Invoice) -> DomainResult<()> {
        self.append(Self::INVOICES_FILE, invoice)
    }

    fn append_transaction(&self, txn: &Transaction) -> DomainResult<()> {
        self.append(Self::TRANSACTIONS_FILE, txn)
    }

    fn write_ledgers(&self, ledgers: &[Ledger]) -> DomainResult<()> {
        self.write(Self::LEDGERS_FILE, ledgers)
    }
}
