#![forbid(unsafe_code)]

//! Path-addressed change log.
//!
//! # Invariants
//!
//! 1. The aggregate list is the union of the per-path lists, in the same
//!    relative order (recording is chronological).
//! 2. No per-path list holds two consecutive records for the same event
//!    (see [`Change::same_event`]).
//! 3. `reset` leaves the log indistinguishable from a new one.

use indexmap::IndexMap;

use crate::change::Change;
use crate::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    all: Vec<Change>,
    by_path: IndexMap<Path, Vec<Change>>,
}

impl ChangeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `change` under its path and to the aggregate list.
    ///
    /// Returns `false` (and records nothing) if the last record at that path
    /// describes the same event.
    pub fn record(&mut self, change: Change) -> bool {
        let bucket = self.by_path.entry(change.property.clone()).or_default();
        if bucket.last().is_some_and(|last| last.same_event(&change)) {
            return false;
        }
        bucket.push(change.clone());
        self.all.push(change);
        true
    }

    /// Every record, oldest first.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.all
    }

    /// Records for exactly `path`, oldest first.
    #[must_use]
    pub fn changes_at(&self, path: &str) -> &[Change] {
        self.by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Paths that have records, in order of their first record.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.by_path.keys()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.all.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Discard everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
