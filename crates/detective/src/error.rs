#![forbid(unsafe_code)]

use detective_value::ValueKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors at the construction and configuration seams.
///
/// Tracking itself never fails: writes that cannot be stored report `false`,
/// and writes to the reserved key are ignored.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot track a {kind} value: only objects and arrays can be tracked")]
    NotTrackable { kind: ValueKind },

    #[cfg(feature = "serde")]
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn not_trackable(kind: ValueKind) -> Self {
        Self::NotTrackable { kind }
    }
}
