//! Core identifier types for the runtime.
//!
//! All IDs are lightweight Copy types using newtype pattern for type safety.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for prompts.
///
/// A Marker identifies a handler installation point (prompt) in the continuation stack.
/// Splitting compares markers by value, never by structure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Marker(pub u64);

/// Unique identifier for captured continuations (one-shot tracking).
///
/// Each captured continuation gets a unique ContId so a second resume can be reported.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContId(pub u64);

/// Unique identifier for a cell inside a scoped state store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FieldId(pub u64);

// Global counters for ID generation
static MARKER_COUNTER: AtomicU64 = AtomicU64::new(1);
static CONT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static FIELD_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl Marker {
    /// Create a fresh unique Marker.
    pub fn fresh() -> Self {
        Marker(MARKER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a Marker with a specific value (for testing).
    pub fn from_raw(value: u64) -> Self {
        Marker(value)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl ContId {
    /// Create a fresh unique ContId.
    pub fn fresh() -> Self {
        ContId(CONT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(value: u64) -> Self {
        ContId(value)
    }
}

impl FieldId {
    pub fn fresh() -> Self {
        FieldId(FIELD_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_fresh_is_unique() {
        let m1 = Marker::fresh();
        let m2 = Marker::fresh();
        assert_ne!(m1, m2);
    }

    #[test]
    fn test_cont_id_fresh_is_unique() {
        let c1 = ContId::fresh();
        let c2 = ContId::fresh();
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_field_id_fresh_is_unique() {
        let f1 = FieldId::fresh();
        let f2 = FieldId::fresh();
        assert_ne!(f1, f2);
        assert!(f2.raw() > f1.raw());
    }

    #[test]
    fn test_marker_compares_by_value() {
        let marker = Marker::fresh();
        assert_eq!(Marker::from_raw(marker.raw()), marker);
    }
}
