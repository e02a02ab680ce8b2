#![forbid(unsafe_code)]

//! Uniform keyed access over objects and arrays.

use crate::key::{Key, MAX_ARRAY_INDEX};
use crate::value::{Array, Object, Value, ValueKind};

const LENGTH: &str = "length";

/// A value that holds properties: an [`Object`] or an [`Array`].
///
/// Only containers can be tracked. The accessors mirror plain property
/// access: reading a missing key yields `Undefined`, writing creates it.
///
/// Arrays accept index keys (and names that are canonical indices) plus the
/// `"length"` name. Any other key reads as `Undefined` and cannot be written.
#[derive(Clone, Debug)]
pub enum Container {
    Object(Object),
    Array(Array),
}

impl Container {
    #[must_use]
    pub fn get(&self, key: &Key) -> Value {
        match self {
            Self::Object(object) => object.get(key),
            Self::Array(array) => match key.as_index() {
                Some(index) => array.get(index),
                None if is_length(key) => Value::from(array.len()),
                None => Value::Undefined,
            },
        }
    }

    /// Whether [`set`](Self::set) would succeed for this key and value.
    #[must_use]
    pub fn can_set(&self, key: &Key, value: &Value) -> bool {
        match self {
            Self::Object(_) => true,
            Self::Array(_) => {
                key.as_index().is_some() || (is_length(key) && array_length(value).is_some())
            }
        }
    }

    /// Write `value` at `key`. Returns whether the write happened.
    pub fn set(&self, key: Key, value: Value) -> bool {
        match self {
            Self::Object(object) => {
                object.insert(key, value);
                true
            }
            Self::Array(array) => {
                if let Some(index) = key.as_index() {
                    array.set(index, value).is_some()
                } else if is_length(&key) {
                    array_length(&value).is_some_and(|len| array.resize(len))
                } else {
                    false
                }
            }
        }
    }

    /// Remove `key`. Array indices become holes; an array's `"length"`
    /// cannot be deleted.
    pub fn delete(&self, key: &Key) -> bool {
        match self {
            Self::Object(object) => {
                object.remove(key);
                true
            }
            Self::Array(array) => match key.as_index() {
                Some(index) => {
                    array.clear_slot(index);
                    true
                }
                None => !is_length(key),
            },
        }
    }

    #[must_use]
    pub fn has(&self, key: &Key) -> bool {
        match self {
            Self::Object(object) => object.contains_key(key),
            Self::Array(array) => {
                key.as_index().is_some_and(|index| index < array.len()) || is_length(key)
            }
        }
    }

    /// Own keys: object keys in insertion order, or array indices.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Self::Object(object) => object.keys(),
            Self::Array(array) => (0..array.len()).map(Key::Index).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Object(object) => object.len(),
            Self::Array(array) => array.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Object(_) => ValueKind::Object,
            Self::Array(_) => ValueKind::Array,
        }
    }

    /// Whether both containers are the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// A [`Value`] handle to the same storage.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Object(object) => Value::Object(object.clone()),
            Self::Array(array) => Value::Array(array.clone()),
        }
    }
}

fn is_length(key: &Key) -> bool {
    key.as_name() == Some(LENGTH)
}

fn array_length(value: &Value) -> Option<usize> {
    let n = value.as_f64()?;
    let max = (MAX_ARRAY_INDEX + 1) as f64;
    (n >= 0.0 && n.fract() == 0.0 && n <= max).then_some(n as usize)
}

impl From<Object> for Container {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Array> for Container {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

impl From<Container> for Value {
    fn from(container: Container) -> Self {
        match container {
            Container::Object(object) => Self::Object(object),
            Container::Array(array) => Self::Array(array),
        }
    }
}

impl TryFrom<Value> for Container {
    /// The rejected value is handed back.
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self::Object(object)),
            Value::Array(array) => Ok(Self::Array(array)),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
