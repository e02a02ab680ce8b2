#![forbid(unsafe_code)]

//! Dot-joined property paths.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use detective_value::Key;

/// Location of a property relative to the tracking root, e.g. `"value.c.e.f"`.
///
/// The root itself is the empty path; its direct properties have one
/// segment. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Rc<str>);

impl Path {
    #[must_use]
    pub fn root() -> Self {
        Self(Rc::from(""))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path of `key` below this one.
    #[must_use]
    pub fn child(&self, key: &Key) -> Self {
        if self.is_root() {
            Self(Rc::from(key.to_string()))
        } else {
            Self(Rc::from(format!("{}.{key}", self.0)))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments from the root; empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|segment| !segment.is_empty())
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Path {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self(Rc::from(path))
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self(Rc::from(path))
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl PartialEq<str> for Path {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Path {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
