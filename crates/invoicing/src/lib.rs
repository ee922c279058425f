//! GST invoicing domain module.
//!
//! This crate contains the business rules for GST-compliant invoices,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). The engine turns a validated set of inputs into a fully priced
//! invoice with the CGST/SGST/IGST split decided by place of supply.

pub mod engine;
pub mod invoice;

pub use engine::{InvoiceEngine, InvoiceInputs};
pub use invoice::{
    GstRate, Invoice, InvoiceItem, InvoiceStatus, ItemInput, TaxTreatment, DEFAULT_SAC_CODE,
};
