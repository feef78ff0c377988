//! Identifier sources for freshly created entities.
//!
//! # Responsibility
//! - Hand out opaque identifiers for accounts, task lists and tasks.
//! - Keep the generation algorithm outside of entity constructors.
//!
//! # Invariants
//! - Every call to `IdSource::next_id` returns a value never returned before
//!   by the same source.
//! - Restored entities keep the identifier they were persisted with.

use std::cell::Cell;
use uuid::Uuid;

/// Supplier of unique opaque identifiers.
pub trait IdSource {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers, the default for interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic `<prefix>-<n>` identifiers.
///
/// Deterministic, so useful for fixtures and golden outputs.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let current = self.next.get();
        self.next.set(current + 1);
        format!("{}-{current}", self.prefix)
    }
}
