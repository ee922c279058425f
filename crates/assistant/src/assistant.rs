//! The assistant service: sessions, routing and record keeping behind the
//! two public calls `handle_message` and `get_session_state`.

use std::sync::{Arc, RwLock};

use chrono::{Duration, NaiveDate};

use bahi_conversation::{
    is_cancel, CommandInterpreter, ConversationEngine, ExpenseDraft, ExtractedFields,
    FieldExtractor, FlowState, Intent, InvoiceDraft, Outcome, PaymentDraft, Reply, SessionState,
    Turn,
};
use bahi_core::{Money, SessionId};
use bahi_invoicing::{Invoice, InvoiceEngine, InvoiceInputs};
use bahi_ledger::{
    EntryKind, LedgerStore, PeriodFilter, Transaction, TransactionKind, TransactionRecorder,
};
use bahi_session::{SessionStore, DEFAULT_SESSION_TTL_SECS};

use crate::render;
use crate::sink::{InMemorySink, RecordSink};

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// The business's own state, used to decide IGST vs CGST+SGST when the
    /// sender GSTIN doesn't pin it down.
    pub seller_state: Option<String>,
    pub session_ttl: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            seller_state: None,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

/// What `handle_message` returns to the embedding surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReply {
    pub session_id: SessionId,
    pub response_text: String,
    pub state: SessionState,
}

/// Read-only session introspection.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub data: serde_json::Value,
}

pub struct Assistant {
    config: AssistantConfig,
    sessions: SessionStore<FlowState>,
    ledgers: Arc<LedgerStore>,
    recorder: TransactionRecorder,
    invoices: RwLock<Vec<Invoice>>,
    interpreter: CommandInterpreter,
    sink: Box<dyn RecordSink>,
}

impl Assistant {
    pub fn new(config: AssistantConfig, sink: Box<dyn RecordSink>) -> Self {
        let ledgers = Arc::new(LedgerStore::new());
        Self {
            sessions: SessionStore::with_ttl(config.session_ttl),
            recorder: TransactionRecorder::new(ledgers.clone()),
            ledgers,
            invoices: RwLock::new(Vec::new()),
            interpreter: CommandInterpreter::default(),
            sink,
            config,
        }
    }

    /// Default configuration with an in-memory sink.
    pub fn in_memory() -> Self {
        Self::new(AssistantConfig::default(), Box::new(InMemorySink::new()))
    }

    /// Swap the one-shot field extractor (the default is the built-in
    /// heuristic one).
    pub fn with_extractor(mut self, extractor: Box<dyn FieldExtractor + Send + Sync>) -> Self {
        self.interpreter = CommandInterpreter::new(extractor);
        self
    }

    pub fn ledgers(&self) -> &LedgerStore {
        &self.ledgers
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.recorder.transactions()
    }

    fn find_invoice(&self, id: &str) -> Option<Invoice> {
        self.invoices
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|i| i.id.eq_ignore_ascii_case(id))
            .cloned()
    }

    /// Drop expired sessions; safe to call from a periodic timer.
    pub fn sweep_sessions(&self) -> usize {
        self.sessions.expire_sweep()
    }

    /// Handle one user message.
    ///
    /// A missing, expired or unknown session id transparently starts a new
    /// session; the reply then opens with a note that the previous
    /// conversation was lost.
    pub fn handle_message(&self, text: &str, session: Option<SessionId>) -> MessageReply {
        let (id, flow, lost) = self.resolve_session(session);
        let note = if lost {
            "(Your previous session expired, so we're starting fresh.)\n\n"
        } else {
            ""
        };

        // Cancel wins over everything, including mid-flow dispatch.
        let body = if is_cancel(text) {
            let _ = self.sessions.clear(&id);
            render::CANCELLED.to_string()
        } else if flow.is_idle() {
            self.handle_idle(&id, text)
        } else {
            self.handle_flow(&id, text)
        };

        let state = self
            .sessions
            .get(&id)
            .map(|s| s.flow.label())
            .unwrap_or(SessionState::Idle);
        MessageReply {
            session_id: id,
            response_text: format!("{note}{body}"),
            state,
        }
    }

    /// Read-only view of a session's state and draft, if the session is
    /// alive. Refreshes the sliding expiry like any other access.
    pub fn get_session_state(&self, id: &SessionId) -> Option<SessionSnapshot> {
        let session = self.sessions.get(id)?;
        let data = serde_json::to_value(&session.flow).unwrap_or(serde_json::Value::Null);
        Some(SessionSnapshot {
            state: session.flow.label(),
            data,
        })
    }

    fn resolve_session(&self, id: Option<SessionId>) -> (SessionId, FlowState, bool) {
        if let Some(id) = id {
            if let Some(session) = self.sessions.get(&id) {
                return (id, session.flow, false);
            }
            return (self.sessions.create(), FlowState::Idle, true);
        }
        (self.sessions.create(), FlowState::Idle, false)
    }

    fn handle_idle(&self, id: &SessionId, text: &str) -> String {
        match self.interpreter.interpret(text) {
            Intent::StartInvoice => self.open(id, ConversationEngine::open_invoice()),
            Intent::StartExpense => self.open(id, ConversationEngine::open_expense()),
            Intent::StartPayment => self.open(id, ConversationEngine::open_payment()),
            Intent::ShowInvoice(inv_id) => match self.find_invoice(&inv_id) {
                Some(invoice) => render::invoice_details(&invoice),
                None => format!(
                    "No invoice {inv_id} here. Ids look like INV-20250405120000; \
                     'menu' shows what I can do."
                ),
            },
            Intent::ShowLedger(name) => match self.ledgers.get(&name) {
                Some(ledger) => render::ledger(&ledger),
                None => format!(
                    "No ledger for {name} yet — it appears after the first invoice or \
                     transaction with them."
                ),
            },
            Intent::ExpenseSummary(filter) => {
                render::expense_summary(&self.recorder.summarize_expenses(filter), filter)
            }
            Intent::FinancialReport => {
                render::report(&self.recorder.report(PeriodFilter::All), PeriodFilter::All)
            }
            Intent::Menu => render::MENU.to_string(),
            Intent::Help => render::HELP.to_string(),
            Intent::Cancel => render::CANCELLED.to_string(),
            Intent::OneShotInvoice { recipient, items } => self.create_invoice(
                id,
                InvoiceDraft {
                    recipient: Some(recipient),
                    items,
                    ..InvoiceDraft::default()
                },
            ),
            Intent::OneShotExpense(fields) => {
                self.record_from_fields(TransactionKind::Expense, fields)
            }
            Intent::OneShotPayment(fields) => {
                self.record_from_fields(TransactionKind::Income, fields)
            }
            Intent::Unknown => format!("I didn't catch that.\n\n{}", render::HELP),
        }
    }

    fn handle_flow(&self, id: &SessionId, text: &str) -> String {
        // Advance and store the transition under the session lock, so two
        // concurrent messages can never both observe the same step. A
        // terminal turn leaves the stored state Idle before the lock drops;
        // side effects run on the extracted outcome afterwards.
        let reply = self.sessions.modify(id, |flow| {
            let Turn { next, reply } = ConversationEngine::advance(std::mem::take(flow), text);
            *flow = next;
            reply
        });
        match reply {
            Ok(Reply::Prompt(prompt)) => prompt,
            Ok(Reply::Outcome(outcome)) => self.finish(id, outcome),
            // Expired between lookup and advance; start over.
            Err(_) => format!(
                "(Your previous session expired, so we're starting fresh.)\n\n{}",
                render::MENU
            ),
        }
    }

    fn open(&self, id: &SessionId, turn: Turn) -> String {
        if self.sessions.update(id, turn.next).is_err() {
            return self.defect(id, "session vanished while opening a flow");
        }
        match turn.reply {
            Reply::Prompt(prompt) => prompt,
            Reply::Outcome(_) => self.defect(id, "flow opening produced an outcome"),
        }
    }

    // The session is already Idle when this runs (the transition was stored
    // under the lock in `handle_flow`).
    fn finish(&self, id: &SessionId, outcome: Outcome) -> String {
        match outcome {
            Outcome::Cancelled => render::CANCELLED.to_string(),
            Outcome::InvoiceReady(draft) => self.create_invoice(id, draft),
            Outcome::ExpenseReady(draft) => self.finish_expense(id, draft),
            Outcome::PaymentReady(draft) => self.finish_payment(id, draft),
        }
    }

    fn finish_expense(&self, id: &SessionId, draft: ExpenseDraft) -> String {
        let Some(amount) = draft.amount else {
            return self.defect(id, "expense flow completed without an amount");
        };
        self.record(
            TransactionKind::Expense,
            draft.vendor.as_deref(),
            amount,
            draft.category.as_deref(),
            draft.date,
            draft.notes.as_deref(),
        )
    }

    fn finish_payment(&self, id: &SessionId, draft: PaymentDraft) -> String {
        let Some(amount) = draft.amount else {
            return self.defect(id, "payment flow completed without an amount");
        };
        self.record(
            TransactionKind::Income,
            draft.from_party.as_deref(),
            amount,
            None,
            draft.date,
            draft.notes.as_deref(),
        )
    }

    fn create_invoice(&self, id: &SessionId, draft: InvoiceDraft) -> String {
        let Some(recipient) = draft.recipient else {
            return self.defect(id, "invoice flow completed without a recipient");
        };

        let inputs = InvoiceInputs {
            recipient,
            items: draft.items,
            recipient_gst: draft.recipient_gst,
            sender_gst: draft.sender_gst,
            place_of_supply: draft.place_of_supply,
            seller_state: self.config.seller_state.clone(),
            reverse_charge: false,
            issued_at: None,
        };
        let invoice = match InvoiceEngine::build(inputs) {
            Ok(invoice) => invoice,
            Err(e) => return self.defect(id, &format!("invoice build failed: {e}")),
        };

        self.ledgers.post(
            &invoice.recipient,
            EntryKind::Invoice,
            invoice.total_amount,
            Some(invoice.ledger_reason()),
            invoice.issue_date,
        );
        self.invoices
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(invoice.clone());

        if let Err(e) = self
            .sink
            .append_invoice(&invoice)
            .and_then(|()| self.sink.write_ledgers(&self.ledgers.snapshot()))
        {
            tracing::error!(invoice_id = %invoice.id, error = %e, "invoice persistence failed");
            return render::PERSIST_FAILED.to_string();
        }
        render::invoice_created(&invoice)
    }

    fn record_from_fields(&self, kind: TransactionKind, fields: ExtractedFields) -> String {
        self.record(
            kind,
            fields.name.as_deref(),
            fields.amount,
            fields.category.as_deref(),
            fields.date,
            fields.notes.as_deref(),
        )
    }

    fn record(
        &self,
        kind: TransactionKind,
        name: Option<&str>,
        amount: Money,
        category: Option<&str>,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> String {
        let txn = match self.recorder.record(kind, name, amount, category, date, notes) {
            Ok(txn) => txn,
            Err(e) => return format!("I couldn't record that: {e}"),
        };

        if let Err(e) = self
            .sink
            .append_transaction(&txn)
            .and_then(|()| self.sink.write_ledgers(&self.ledgers.snapshot()))
        {
            tracing::error!(transaction_id = %txn.id, error = %e, "transaction persistence failed");
            return render::PERSIST_FAILED.to_string();
        }

        let balance = txn
            .name
            .as_deref()
            .and_then(|n| self.ledgers.get(n))
            .map(|l| l.balance);
        render::transaction_recorded(&txn, balance)
    }

    /// Engine-defect escape hatch: log loudly, reset the session and
    /// apologize instead of leaking an internal error to the user.
    fn defect(&self, id: &SessionId, detail: &str) -> String {
        tracing::error!(session_id = %id, detail, "conversation defect");
        let _ = self.sessions.clear(id);
        render::DEFECT.to_string()
    }
}
