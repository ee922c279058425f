//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values, never
/// by identity. `Money { paise: 100 }` equals any other `Money { paise: 100 }`;
/// a `Session` with the same fields but a different id does not equal another.
///
/// The trait requires `Clone + PartialEq + Debug` so values can be copied,
/// compared and logged like primitives.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
