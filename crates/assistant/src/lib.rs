//! The assistant service crate: the public conversational surface.
//!
//! Wires the session store, conversation engine, invoice engine and ledger
//! together behind two calls:
//!
//! - [`Assistant::handle_message`] — one user message in, one reply out.
//! - [`Assistant::get_session_state`] — read-only session introspection.
//!
//! Completed invoices and transactions are handed to a [`RecordSink`];
//! [`JsonFileSink`] persists them as JSON files, [`InMemorySink`] keeps them
//! in process.

pub mod assistant;
pub mod render;
pub mod sink;

pub use assistant::{Assistant, AssistantConfig, MessageReply, SessionSnapshot};
pub use sink::{InMemorySink, JsonFileSink, RecordSink};
