//! Flow state: step enums and typed drafts.
//!
//! Each guided flow is a step enum plus a draft record filled in
//! incrementally. The pair travels inside [`FlowState`], which is the payload
//! stored per session. An unknown or corrupt step is unrepresentable; the
//! worst a stale session can hold is a valid step with an incomplete draft.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bahi_core::{Gstin, Money};
use bahi_invoicing::ItemInput;

/// Coarse session label exposed for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InvoiceFlow,
    ExpenseFlow,
    PaymentFlow,
    LedgerFlow,
}

/// Steps of the guided invoice flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStep {
    Recipient,
    RecipientGst,
    SenderGst,
    PlaceOfSupply,
    Items,
    Confirm,
}

/// Steps of the guided expense flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStep {
    Amount,
    Date,
    Category,
    Vendor,
    Notes,
    Confirm,
}

/// Steps of the guided payment-received flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStep {
    FromParty,
    Amount,
    Date,
    Notes,
    Confirm,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub recipient: Option<String>,
    pub recipient_gst: Option<Gstin>,
    pub sender_gst: Option<Gstin>,
    pub place_of_supply: Option<String>,
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub from_party: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// The full conversational state of one session.
///
/// `Ledger` is a reserved interactive state; entering it currently resets to
/// idle on the next message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", content = "data", rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    Invoice(InvoiceStep, InvoiceDraft),
    Expense(ExpenseStep, ExpenseDraft),
    Payment(PaymentStep, PaymentDraft),
    Ledger,
}

impl FlowState {
    pub fn label(&self) -> SessionState {
        match self {
            FlowState::Idle => SessionState::Idle,
            FlowState::Invoice(..) => SessionState::InvoiceFlow,
            FlowState::Expense(..) => SessionState::ExpenseFlow,
            FlowState::Payment(..) => SessionState::PaymentFlow,
            FlowState::Ledger => SessionState::LedgerFlow,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FlowState::Idle)
    }
}
