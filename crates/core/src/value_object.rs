//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. Two value objects with the same values
//! are considered equal (e.g. two prices of `10`).

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one. Requires:
/// - **Clone**: they are values, not references
/// - **PartialEq**: compared by their attribute values
/// - **Debug**: loggable and testable
///
/// ```ignore
/// let a = Price::new(10.0)?;
/// let b = Price::new(10.0)?;
/// assert_eq!(a, b); // equal by value
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
