//! Per-party ledgers with strict balance arithmetic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bahi_core::Money;

/// Ledger entry kind.
///
/// `Invoice` entries add their signed amount to the balance; `Payment`
/// entries subtract theirs. Expenses are posted as negative `Invoice`
/// entries, so the invariant
/// `balance == Σ(invoice amounts) − Σ(payment amounts)` holds for every
/// reachable ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Invoice,
    Payment,
}

/// One immutable ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: EntryKind,
    /// Signed amount; see `EntryKind` for the balance rule.
    pub amount: Money,
    pub reason: Option<String>,
    pub date: DateTime<Utc>,
}

impl LedgerEntry {
    /// This entry's contribution to the running balance.
    pub fn balance_delta(&self) -> Money {
        match self.kind {
            EntryKind::Invoice => self.amount,
            EntryKind::Payment => -self.amount,
        }
    }
}

/// A party's running account. Created lazily on first entry; never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub party: String,
    pub entries: Vec<LedgerEntry>,
    pub balance: Money,
}

impl Ledger {
    fn new(party: String) -> Self {
        Self {
            party,
            entries: Vec::new(),
            balance: Money::zero(),
        }
    }

    /// Recompute the balance from entry history.
    ///
    /// Repair/verification tooling only — the request path maintains
    /// `balance` incrementally on every append.
    pub fn recompute_balance(&self) -> Money {
        self.entries.iter().map(LedgerEntry::balance_delta).sum()
    }
}

/// Thread-safe map of party name → ledger.
///
/// Same locking shape as the session store: the outer `RwLock` guards only
/// the map, each ledger has its own `Mutex` so appends for one party are
/// linearizable and parties never block each other.
#[derive(Debug, Default)]
pub struct LedgerStore {
    ledgers: RwLock<HashMap<String, Arc<Mutex<Ledger>>>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `party`, creating the ledger on first use.
    ///
    /// The entry append and balance update happen in one critical section.
    pub fn post(
        &self,
        party: &str,
        kind: EntryKind,
        amount: Money,
        reason: Option<String>,
        date: DateTime<Utc>,
    ) {
        let slot = self.slot(party);
        let mut ledger = slot.lock().unwrap_or_else(|e| e.into_inner());
        let entry = LedgerEntry {
            kind,
            amount,
            reason,
            date,
        };
        ledger.balance += entry.balance_delta();
        ledger.entries.push(entry);
        tracing::debug!(party, balance = %ledger.balance, "ledger entry posted");
    }

    /// Snapshot of a party's ledger, if any entries were ever posted.
    pub fn get(&self, party: &str) -> Option<Ledger> {
        let ledgers = self.ledgers.read().unwrap_or_else(|e| e.into_inner());
        let slot = ledgers.get(party)?;
        let ledger = slot.lock().unwrap_or_else(|e| e.into_inner());
        Some(ledger.clone())
    }

    /// All party names with a ledger.
    pub fn parties(&self) -> Vec<String> {
        let ledgers = self.ledgers.read().unwrap_or_else(|e| e.into_inner());
        ledgers.keys().cloned().collect()
    }

    /// Snapshot of every ledger (persistence support).
    pub fn snapshot(&self) -> Vec<Ledger> {
        let ledgers = self.ledgers.read().unwrap_or_else(|e| e.into_inner());
        ledgers
            .values()
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
            .collect()
    }

    fn slot(&self, party: &str) -> Arc<Mutex<Ledger>> {
        {
            let ledgers = self.ledgers.read().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = ledgers.get(party) {
                return slot.clone();
            }
        }
        let mut ledgers = self.ledgers.write().unwrap_or_else(|e| e.into_inner());
        ledgers
            .entry(party.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Ledger::new(party.to_string()))))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn ledger_is_created_lazily_on_first_post() {
        let store = LedgerStore::new();
        assert!(store.get("Acme Co").is_none());

        store.post("Acme Co", EntryKind::Invoice, Money::from_rupees(1000), None, now());

        let ledger = store.get("Acme Co").unwrap();
        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.balance, Money::from_rupees(1000));
    }

    #[test]
    fn payments_reduce_what_the_party_owes() {
        let store = LedgerStore::new();
        store.post("Ramesh", EntryKind::Invoice, Money::from_rupees(5000), None, now());
        store.post(
            "Ramesh",
            EntryKind::Payment,
            Money::from_rupees(2000),
            Some("part payment".into()),
            now(),
        );

        assert_eq!(store.get("Ramesh").unwrap().balance, Money::from_rupees(3000));
    }

    #[test]
    fn negative_invoice_entry_models_an_expense() {
        let store = LedgerStore::new();
        store.post(
            "Office Mart",
            EntryKind::Invoice,
            -Money::from_rupees(500),
            Some("Supplies".into()),
            now(),
        );

        let ledger = store.get("Office Mart").unwrap();
        assert_eq!(ledger.balance, -Money::from_rupees(500));
        assert!(ledger.balance.is_negative()); // payable to them
    }

    proptest! {
        /// After any sequence of posts, the running balance equals
        /// Σ(invoice amounts) − Σ(payment amounts).
        #[test]
        fn balance_matches_entry_history(
            ops in prop::collection::vec(
                (prop::bool::ANY, -1_000_000i64..1_000_000i64),
                1..40,
            )
        ) {
            let store = LedgerStore::new();
            for (is_invoice, paise) in &ops {
                let kind = if *is_invoice { EntryKind::Invoice } else { EntryKind::Payment };
                store.post("P", kind, Money::from_paise(*paise), None, now());
            }

            let ledger = store.get("P").unwrap();
            prop_assert_eq!(ledger.balance, ledger.recompute_balance());

            let invoices: Money = ledger
                .entries
                .iter()
                .filter(|e| e.kind == EntryKind::Invoice)
                .map(|e| e.amount)
                .sum();
            let payments: Money = ledger
                .entries
                .iter()
                .filter(|e| e.kind == EntryKind::Payment)
                .map(|e| e.amount)
                .sum();
            prop_assert_eq!(ledger.balance, invoices - payments);
        }
    }
}
