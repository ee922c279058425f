//! Session lifecycle: keyed conversation sessions with sliding TTL expiry.
//!
//! The store is generic over the flow-state payload so conversation logic can
//! stay a pure `(state, input) -> (state, output)` function with no knowledge
//! of storage or locking.

pub mod store;

pub use store::{Session, SessionStore, DEFAULT_SESSION_TTL_SECS};
