#![forbid(unsafe_code)]

//! Change records.

use std::fmt;

use detective_value::{Value, same_value};

use crate::path::Path;

/// Which mutation produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ChangeKind {
    /// An assignment to a property.
    #[default]
    Changed,
    /// A property was introduced (needs `detect_property_adding`).
    Added,
    /// A property was deleted (needs `detect_property_removing`).
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Changed => "changed",
            Self::Added => "added",
            Self::Removed => "removed",
        })
    }
}

/// One recorded change: where, from what, to what.
///
/// The change log only hands out clones, so a `Change` obtained from it can
/// never alter what was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub property: Path,
    pub previous: Value,
    pub current: Value,
    pub kind: ChangeKind,
}

impl Change {
    /// A [`ChangeKind::Changed`] record.
    #[must_use]
    pub fn new(
        property: impl Into<Path>,
        previous: impl Into<Value>,
        current: impl Into<Value>,
    ) -> Self {
        Self {
            property: property.into(),
            previous: previous.into(),
            current: current.into(),
            kind: ChangeKind::Changed,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ChangeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether `other` describes the same transition at the same path.
    ///
    /// The kind is ignored: an assignment that introduces a property is seen
    /// both as an add and as a change, and both describe one event.
    #[must_use]
    pub fn same_event(&self, other: &Self) -> bool {
        self.property == other.property
            && same_value(&self.previous, &other.previous)
            && same_value(&self.current, &other.current)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Change {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Change", 4)?;
        state.serialize_field("property", self.property.as_str())?;
        state.serialize_field("previous", &self.previous.to_json())?;
        state.serialize_field("current", &self.current.to_json())?;
        state.serialize_field("kind", &self.kind)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
