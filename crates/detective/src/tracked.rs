#![forbid(unsafe_code)]

//! The tracking proxy.
//!
//! A [`Tracked`] stands in for a container. Reads and writes go straight
//! through to the caller's storage; writes, deletes and definitions
//! additionally run the change pipeline:
//!
//! ```text
//! mutation ──► interceptors ──(suppressed)──► nothing recorded
//!                   │
//!                   ▼
//!              detectors ──► change log ──(accepted)──► subscribers
//! ```
//!
//! The write itself always happens; detection never blocks or reverts it.
//!
//! # Nested proxies
//!
//! With deep detection, reading a container-valued property returns a new
//! `Tracked` for it, sharing the root's pipelines, log and subscribers and
//! carrying the extended path. Nested proxies are not cached: every read
//! builds a fresh wrapper. Use [`Tracked::ptr_eq`] to ask whether two
//! wrappers stand for the same container.
//!
//! # Failure Modes
//!
//! - **Panicking hook**: a detector, interceptor or subscriber that panics
//!   unwinds through the mutating call. The write has already been applied
//!   and no borrow is held, so the graph stays usable.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use detective_value::{Container, Key, Symbol, Value};

use crate::change::ChangeKind;
use crate::context::ChangeContext;
use crate::detective::Detective;
use crate::detector::Detectors;
use crate::interceptor::Interceptors;
use crate::log::ChangeLog;
use crate::options::Options;
use crate::path::Path;
use crate::subscription::{self, SubscriberRegistry};

/// The reserved key exposing a tracked value's [`Detective`].
///
/// Reading it yields [`Member::Detective`]; writing or deleting it is
/// ignored and reports success. It never reaches the underlying container.
pub const CHANGE_DETECTIVE: Key = Key::Symbol(Symbol::predefined(0, "change-detective"));

/// State shared by every proxy of one tracked root.
pub(crate) struct Shared {
    pub(crate) options: Options,
    pub(crate) detectors: Detectors,
    pub(crate) interceptors: Interceptors,
    pub(crate) log: RefCell<ChangeLog>,
    pub(crate) subscribers: Rc<RefCell<SubscriberRegistry>>,
}

/// What a read through a [`Tracked`] yields.
#[derive(Debug, Clone)]
pub enum Member {
    /// A primitive, an opaque, or (without deep detection) a raw container.
    Value(Value),
    /// A nested proxy for a container-valued property.
    Tracked(Tracked),
    /// The engine handle, read through [`CHANGE_DETECTIVE`].
    Detective(Detective),
}

impl Member {
    /// The plain value: a nested proxy yields its underlying container, the
    /// engine handle yields `Undefined`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Tracked(tracked) => tracked.to_value(),
            Self::Detective(_) => Value::Undefined,
        }
    }

    #[must_use]
    pub fn into_tracked(self) -> Option<Tracked> {
        match self {
            Self::Tracked(tracked) => Some(tracked),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_detective(self) -> Option<Detective> {
        match self {
            Self::Detective(detective) => Some(detective),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }
}

/// A change-tracking proxy over a container.
///
/// Cloning a `Tracked` creates another handle to the same container and the
/// same tracking state.
#[derive(Clone)]
pub struct Tracked {
    target: Container,
    path: Path,
    shared: Rc<Shared>,
}

impl Tracked {
    pub(crate) fn install(
        target: Container,
        options: Options,
        detectors: Detectors,
        interceptors: Interceptors,
    ) -> Self {
        Self {
            target,
            path: Path::root(),
            shared: Rc::new(Shared {
                options,
                detectors,
                interceptors,
                log: RefCell::new(ChangeLog::new()),
                subscribers: Rc::new(RefCell::new(SubscriberRegistry::default())),
            }),
        }
    }

    fn nested(&self, target: Container, key: &Key) -> Self {
        Self {
            target,
            path: self.path.child(key),
            shared: Rc::clone(&self.shared),
        }
    }

    /// Read `key`.
    pub fn get(&self, key: impl Into<Key>) -> Member {
        let key = key.into();
        if key == CHANGE_DETECTIVE {
            return Member::Detective(self.detective());
        }
        match Container::try_from(self.target.get(&key)) {
            Ok(container) if self.shared.options.deep_detection => {
                Member::Tracked(self.nested(container, &key))
            }
            Ok(container) => Member::Value(container.into()),
            Err(value) => Member::Value(value),
        }
    }

    /// Read `key` as a plain value, never wrapping.
    pub fn value(&self, key: impl Into<Key>) -> Value {
        let key = key.into();
        if key == CHANGE_DETECTIVE {
            return Value::Undefined;
        }
        self.target.get(&key)
    }

    /// The nested proxy at `key`, if deep detection yields one.
    pub fn at(&self, key: impl Into<Key>) -> Option<Tracked> {
        self.get(key).into_tracked()
    }

    /// Assign `value` to `key`. Returns whether the write happened.
    ///
    /// With `detect_property_adding`, the assignment first passes through the
    /// definition step (reported as [`ChangeKind::Added`] for new
    /// properties). The assignment itself is detected after the write.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        if key == CHANGE_DETECTIVE {
            return true;
        }

        let previous = self.target.get(&key);
        if self.shared.options.detect_property_adding && self.target.can_set(&key, &value) {
            self.run_change_detection(&value, &Value::Undefined, &key, ChangeKind::Added);
        }
        let written = self.target.set(key.clone(), value.clone());
        if written {
            self.run_change_detection(&value, &previous, &key, ChangeKind::Changed);
        }
        written
    }

    /// Define `key` as `value`. With `detect_property_adding`, new
    /// properties are reported as [`ChangeKind::Added`]; redefining an
    /// existing property is not reported.
    pub fn define(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        if key == CHANGE_DETECTIVE {
            return true;
        }

        if self.shared.options.detect_property_adding && self.target.can_set(&key, &value) {
            self.run_change_detection(&value, &Value::Undefined, &key, ChangeKind::Added);
        }
        self.target.set(key, value)
    }

    /// Delete `key`. With `detect_property_removing`, the removal is
    /// reported as [`ChangeKind::Removed`] before it happens.
    pub fn delete(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if key == CHANGE_DETECTIVE {
            return true;
        }

        if self.shared.options.detect_property_removing {
            let previous = self.target.get(&key);
            self.run_change_detection(&Value::Undefined, &previous, &key, ChangeKind::Removed);
        }
        self.target.delete(&key)
    }

    /// Append to an array. Returns `false` for objects.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match &self.target {
            Container::Array(array) => self.set(Key::Index(array.len()), value),
            Container::Object(_) => false,
        }
    }

    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.target.has(&key.into())
    }

    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.target.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Location of this proxy from the tracking root (empty at the root).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying container.
    #[must_use]
    pub fn target(&self) -> &Container {
        &self.target
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        self.target.to_value()
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.shared.options
    }

    /// The engine handle; same as reading [`CHANGE_DETECTIVE`].
    #[must_use]
    pub fn detective(&self) -> Detective {
        Detective::new(Rc::clone(&self.shared))
    }

    /// Whether both proxies wrap the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.target.ptr_eq(&other.target)
    }

    fn run_change_detection(&self, current: &Value, previous: &Value, key: &Key, kind: ChangeKind) {
        let shared = &self.shared;
        let path = self.path.child(key);
        let ctx = ChangeContext {
            current,
            previous,
            key,
            path: &path,
            target: &self.target,
            kind,
            options: &shared.options,
        };

        if shared.interceptors.suppresses(&ctx) {
            tracing::trace!(message = "detective.intercepted", path = %path, kind = %kind);
            return;
        }

        for change in shared.detectors.detect(&ctx) {
            let accepted = shared.log.borrow_mut().record(change.clone());
            if !accepted {
                tracing::trace!(message = "detective.collapsed", path = %change.property);
                continue;
            }
            tracing::debug!(
                message = "detective.change",
                path = %change.property,
                kind = %change.kind
            );
            subscription::notify(&shared.subscribers, &change);
        }
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("path", &self.path)
            .field("target", &self.target)
            .field("options", &self.shared.options)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::Change;
    use crate::config::Config;
    use detective_value::{Array, Object};
    use std::cell::Cell;
    use tracing_test::traced_test;

    fn track(object: &Object, options: Options) -> Tracked {
        Config::new().with_options(options).track(object.clone())
    }

    #[test]
    fn writes_reach_the_raw_value() {
        let raw = Object::new().with("a", 12);
        let tracked = track(&raw, Options::default());
        assert!(tracked.set("a", 42));
        assert_eq!(raw.get(&Key::from("a")), Value::from(42));
    }

    #[test]
    fn symbol_keys_are_forwarded() {
        let raw = Object::new();
        let tracked = track(&raw, Options::default());
        let tag = Symbol::new("tag");
        tracked.set(tag, 42);
        assert_eq!(raw.get(&Key::from(tag)), Value::from(42));
    }

    #[test]
    fn reserved_key_never_reaches_the_raw_value() {
        let raw = Object::new().with("a", 12);
        let tracked = track(&raw, Options::default());
        assert!(matches!(tracked.get(CHANGE_DETECTIVE), Member::Detective(_)));
        assert!(tracked.set(CHANGE_DETECTIVE, 1));
        assert!(tracked.delete(CHANGE_DETECTIVE));
        assert!(tracked.define(CHANGE_DETECTIVE, 1));
        assert!(!raw.contains_key(&CHANGE_DETECTIVE));
        assert!(tracked.value(CHANGE_DETECTIVE).is_undefined());
        assert!(!tracked.detective().has_changes());
    }

    #[test]
    fn missing_key_reads_undefined() {
        let tracked = track(&Object::new(), Options::default());
        assert!(matches!(tracked.get("nope"), Member::Value(Value::Undefined)));
    }

    #[test]
    fn deep_reads_return_nested_proxies() {
        let raw = Object::new().with("value", Object::new().with("a", 1));
        let tracked = track(&raw, Options::default());
        let nested = tracked.at("value").unwrap();
        assert_eq!(nested.path(), &Path::from("value"));
        assert!(nested.ptr_eq(&tracked.at("value").unwrap()));
    }

    #[test]
    fn shallow_reads_return_raw_containers() {
        let inner = Object::new().with("a", 1);
        let tracked = track(
            &Object::new().with("value", inner.clone()),
            Options::default().with_deep_detection(false),
        );
        let member = tracked.get("value");
        assert!(!member.is_tracked());
        assert_eq!(member.into_value(), Value::from(inner));
    }

    #[test]
    fn failed_write_runs_no_detection() {
        let tracked = Config::new()
            .with_options(Options::default().with_property_adding(true))
            .track(Array::new());
        assert!(!tracked.set("name", 1));
        assert!(!tracked.detective().has_changes());
    }

    #[test]
    fn push_records_index_path() {
        let list = Array::new();
        let tracked = track(&Object::new().with("list", list.clone()), Options::default());
        assert!(tracked.at("list").unwrap().push("x"));
        assert_eq!(
            tracked.detective().changes(),
            vec![Change::new("list.0", Value::Undefined, "x")]
        );
        assert_eq!(list.len(), 1);
        assert!(!tracked.push(1));
    }

    #[test]
    fn define_existing_property_is_not_reported() {
        let tracked = track(
            &Object::new().with("a", 1),
            Options::default().with_property_adding(true),
        );
        assert!(tracked.define("a", 2));
        assert!(tracked.define("b", 3));
        assert_eq!(
            tracked.detective().changes(),
            vec![Change::new("b", Value::Undefined, 3).with_kind(ChangeKind::Added)]
        );
        assert_eq!(tracked.value("a"), Value::from(2));
    }

    #[test]
    fn delete_without_option_is_silent() {
        let raw = Object::new().with("a", 1);
        let tracked = track(&raw, Options::default());
        assert!(tracked.delete("a"));
        assert!(!raw.contains_key(&Key::from("a")));
        assert!(!tracked.detective().has_changes());
    }

    #[test]
    fn subscriber_may_mutate_reentrantly() {
        let tracked = track(&Object::new().with("a", 0).with("b", 0), Options::default());
        let echo = tracked.clone();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = tracked.detective().subscribe_at("a", move |change| {
            counter.set(counter.get() + 1);
            echo.set("b", change.current.clone());
        });

        tracked.set("a", 5);
        assert_eq!(calls.get(), 1);
        assert_eq!(tracked.value("b"), Value::from(5));
        assert_eq!(tracked.detective().changes().len(), 2);
    }

    #[test]
    fn hooks_see_the_mutated_container() {
        let seen_target = Rc::new(Cell::new(false));
        let flag = Rc::clone(&seen_target);
        let inner = Object::new().with("x", 1);
        let expected = Container::Object(inner.clone());
        let tracked = Config::new()
            .with_detector("target", move |ctx: &ChangeContext<'_>| {
                flag.set(ctx.target.ptr_eq(&expected) && ctx.key == &Key::from("x"));
                false
            })
            .track(Object::new().with("inner", inner));
        tracked.at("inner").unwrap().set("x", 2);
        assert!(seen_target.get());
    }

    #[traced_test]
    #[test]
    fn logs_accepted_and_intercepted_changes() {
        let tracked = track(
            &Object::new().with("a", 1),
            Options::default().with_property_adding(true),
        );
        tracked.set("a", 2);
        assert!(logs_contain("detective.intercepted"));
        assert!(logs_contain("detective.change"));
    }
}
