#![forbid(unsafe_code)]

//! Dynamic values and shared containers.
//!
//! # Design
//!
//! [`Object`] and [`Array`] wrap their storage in `Rc<RefCell<..>>`, the same
//! single-threaded sharing model used for reactive state elsewhere. Every
//! accessor borrows for the duration of the call only and hands out clones,
//! so no borrow is ever live while caller code runs.
//!
//! # Failure Modes
//!
//! - **Cycles**: a container may (indirectly) contain itself. Formatting marks
//!   the repeated container as `[Circular]` instead of recursing.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::equality::same_value;
use crate::key::{Key, MAX_ARRAY_INDEX};

/// Discriminant of a [`Value`]; doubles as its "constructor" for loose
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    Opaque,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Opaque => "opaque",
        })
    }
}

/// A dynamic value.
///
/// Primitives are held inline; containers and opaques are shared handles.
/// Equality is [`same_value`]: `NaN == NaN`, `0.0 != -0.0`, and two
/// containers are equal only if they are the same container.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Array),
    Object(Object),
    Opaque(Opaque),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
            Self::Opaque(_) => ValueKind::Opaque,
        }
    }

    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `Undefined` or `Null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Whether this value is an [`Object`] or an [`Array`].
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Self::Opaque(opaque) => Some(opaque),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        same_value(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A shared, insertion-ordered map from [`Key`] to [`Value`].
///
/// Cloning an `Object` creates a new handle to the **same** storage.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<IndexMap<Key, Value>>>);

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals.
    #[must_use]
    pub fn with(self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value at `key`, or `Undefined` if absent.
    #[must_use]
    pub fn get(&self, key: &Key) -> Value {
        let map = self.0.borrow();
        let found = match key {
            Key::Index(index) => map.get(&Key::Name(index.to_string())),
            other => map.get(other),
        };
        found.cloned().unwrap_or_default()
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0
            .borrow_mut()
            .insert(key.into().into_property(), value.into())
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&self, key: &Key) -> Option<Value> {
        self.0
            .borrow_mut()
            .shift_remove(&key.clone().into_property())
    }

    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.0.borrow().contains_key(&key.clone().into_property())
    }

    /// Snapshot of the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Snapshot of the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Whether both handles point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_object(f, self, &mut Vec::new())
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// A shared, growable list of values.
///
/// Cloning an `Array` creates a new handle to the **same** storage.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element at `index`, or `Undefined` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Value {
        self.0.borrow().get(index).cloned().unwrap_or_default()
    }

    /// Write `index`, padding with `Undefined` holes if it lies past the end.
    /// Returns the previous element, or `None` (writing nothing) if `index`
    /// exceeds [`MAX_ARRAY_INDEX`].
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let min_len = index.checked_add(1).filter(|_| index <= MAX_ARRAY_INDEX)?;
        let mut items = self.0.borrow_mut();
        if min_len > items.len() {
            items.resize(min_len, Value::Undefined);
        }
        Some(std::mem::replace(&mut items[index], value.into()))
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Truncate or pad with `Undefined` holes. Returns `false` (leaving the
    /// array untouched) if `len` exceeds `MAX_ARRAY_INDEX + 1`.
    pub fn resize(&self, len: usize) -> bool {
        if len > MAX_ARRAY_INDEX + 1 {
            return false;
        }
        self.0.borrow_mut().resize(len, Value::Undefined);
        true
    }

    /// Leave a hole at `index`. Returns the previous element.
    pub fn clear_slot(&self, index: usize) -> Value {
        self.0
            .borrow_mut()
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the elements.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Whether both handles point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_array(f, self, &mut Vec::new())
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(Rc::new(RefCell::new(iter.into_iter().map(Into::into).collect())))
    }
}

// ---------------------------------------------------------------------------
// Opaque
// ---------------------------------------------------------------------------

/// A host value the graph can hold but not look inside (a callback, a
/// compiled regex, a timestamp object).
///
/// Opaques compare by identity only. Their concrete type acts as their
/// constructor: opaques of different types are never loosely equal.
#[derive(Clone)]
pub struct Opaque {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl Opaque {
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both opaques wrap the same concrete type.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        Any::type_id(&*self.inner) == Any::type_id(&*other.inner)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner), Rc::as_ptr(&other.inner))
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Self::String(s)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Self::Opaque(opaque)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) if n.is_nan() => f.write_str("NaN"),
        Value::Number(n) if n.is_infinite() => {
            f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
        }
        Value::Number(n) => write!(f, "{n}"),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Array(array) => write_array(f, array, seen),
        Value::Object(object) => write_object(f, object, seen),
        Value::Opaque(opaque) => write!(f, "{opaque:?}"),
    }
}

fn write_array(f: &mut fmt::Formatter<'_>, array: &Array, seen: &mut Vec<usize>) -> fmt::Result {
    let addr = array.addr();
    if seen.contains(&addr) {
        return f.write_str("[Circular]");
    }
    seen.push(addr);
    f.write_str("[")?;
    for (i, item) in array.to_vec().iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_value(f, item, seen)?;
    }
    seen.pop();
    f.write_str("]")
}

fn write_object(f: &mut fmt::Formatter<'_>, object: &Object, seen: &mut Vec<usize>) -> fmt::Result {
    let addr = object.addr();
    if seen.contains(&addr) {
        return f.write_str("[Circular]");
    }
    seen.push(addr);
    f.write_str("{")?;
    for (i, (key, value)) in object.entries().iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        match key {
            Key::Symbol(symbol) => write!(f, " [{symbol}]: ")?,
            other => write!(f, " {other}: ")?,
        }
        write_value(f, value, seen)?;
    }
    seen.pop();
    if object.is_empty() {
        f.write_str("}")
    } else {
        f.write_str(" }")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
