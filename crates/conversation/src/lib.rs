//! Conversation layer: flow state, the guided-flow engine, idle-state
//! command routing and best-effort field extraction.
//!
//! Everything here is pure with respect to storage. The session store keeps a
//! [`FlowState`] per session; the assistant feeds messages through
//! [`CommandInterpreter`] (idle) or [`ConversationEngine::advance`] (mid-flow)
//! and acts on the resulting [`Outcome`]s.

pub mod engine;
pub mod extract;
pub mod flow;
pub mod interpreter;
pub mod parse;

pub use engine::{is_cancel, ConversationEngine, Outcome, Reply, Turn, CANCEL_WORDS};
pub use extract::{ExtractedFields, FieldExtractor, HeuristicExtractor};
pub use flow::{
    ExpenseDraft, ExpenseStep, FlowState, InvoiceDraft, InvoiceStep, PaymentDraft, PaymentStep,
    SessionState,
};
pub use interpreter::{CommandInterpreter, Intent};
pub use parse::{find_amount, parse_items, DEFAULT_ITEM_NAME};
