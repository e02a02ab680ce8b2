#![forbid(unsafe_code)]

//! Property keys: names, array indices, and symbols.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// First id handed out by [`Symbol::new`]. Everything below is reserved for
/// [`Symbol::predefined`].
const FIRST_MINTED_ID: u64 = 1 << 32;

/// Largest key that counts as an array index.
///
/// Arrays are dense, so an index write allocates every slot below it. Larger
/// numeric keys are plain names, which arrays reject.
pub const MAX_ARRAY_INDEX: usize = (1 << 24) - 1;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(FIRST_MINTED_ID);

/// A unique, non-string property key.
///
/// Two symbols are equal only if they come from the same call to
/// [`Symbol::new`] (or share a predefined id). The description is for
/// display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    /// Mint a fresh symbol, distinct from every other symbol.
    #[must_use]
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    /// A library-defined symbol with a fixed id.
    ///
    /// Predefined ids never collide with minted ones.
    #[must_use]
    pub const fn predefined(id: u32, description: &'static str) -> Self {
        Self {
            id: id as u64,
            description,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// A property key.
///
/// Objects store index keys under their decimal name, so `Key::Index(0)` and
/// `Key::Name("0")` address the same object property. Arrays accept indices
/// (and names that are canonical indices) plus the `"length"` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
    Symbol(Symbol),
}

impl Key {
    /// The array index this key denotes, if any.
    ///
    /// Names count only in canonical form: `"7"` is an index, `"07"` is not.
    /// Nothing above [`MAX_ARRAY_INDEX`] is an index.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        let index = match self {
            Self::Index(index) => *index,
            Self::Name(name) => {
                let index: usize = name.parse().ok()?;
                if index.to_string() != *name {
                    return None;
                }
                index
            }
            Self::Symbol(_) => return None,
        };
        (index <= MAX_ARRAY_INDEX).then_some(index)
    }

    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Normalize to the form objects store: indices become names.
    #[must_use]
    pub fn into_property(self) -> Self {
        match self {
            Self::Index(index) => Self::Name(index.to_string()),
            other => other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
            Self::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
