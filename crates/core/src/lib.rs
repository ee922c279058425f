//! `bahi-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! money arithmetic in paise, GSTIN structural validation, user-facing date
//! parsing, typed identifiers and the domain error model.

pub mod dates;
pub mod error;
pub mod gstin;
pub mod id;
pub mod money;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use gstin::Gstin;
pub use id::{SessionId, TransactionId};
pub use money::Money;
pub use value_object::ValueObject;
