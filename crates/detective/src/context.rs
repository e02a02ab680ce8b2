#![forbid(unsafe_code)]

use detective_value::{Container, Key, Value};

use crate::change::{Change, ChangeKind};
use crate::options::Options;
use crate::path::Path;

/// Everything interceptors and detectors see about one observed mutation.
///
/// `target` is the container being mutated (the nested one, for deep
/// mutations); `key` is the property on it and `path` its location from the
/// root. On the add step the target still holds the old value; on the change
/// step it already holds `current`.
#[derive(Debug, Clone, Copy)]
pub struct ChangeContext<'a> {
    pub current: &'a Value,
    pub previous: &'a Value,
    pub key: &'a Key,
    pub path: &'a Path,
    pub target: &'a Container,
    pub kind: ChangeKind,
    pub options: &'a Options,
}

impl ChangeContext<'_> {
    /// The change record this mutation would produce.
    #[must_use]
    pub fn to_change(&self) -> Change {
        Change {
            property: self.path.clone(),
            previous: self.previous.clone(),
            current: self.current.clone(),
            kind: self.kind,
        }
    }
}
