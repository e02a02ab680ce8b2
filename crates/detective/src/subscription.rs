#![forbid(unsafe_code)]

//! Path-keyed and wildcard subscriptions.
//!
//! # Design
//!
//! The registry lives behind `Rc<RefCell<..>>` shared by every proxy of one
//! tracked root. A [`Subscription`] guard holds only a `Weak` handle to it,
//! so an outstanding guard never keeps a tracked value alive.
//!
//! Dispatch clones the matching callbacks into a snapshot and releases the
//! registry borrow before calling any of them. Callbacks may therefore
//! subscribe, unsubscribe (themselves or others), or mutate tracked values;
//! changes to the registry take effect from the next dispatch.
//!
//! # Invariants
//!
//! 1. Path subscribers are notified before wildcard subscribers, each group
//!    in registration order.
//! 2. Unsubscribing removes exactly one registration; repeating it is a
//!    no-op.
//! 3. Dropping a [`Subscription`] unsubscribes unless it was detached.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::change::Change;
use crate::path::Path;

/// What a subscriber listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every accepted change.
    All,
    /// Changes whose path equals this one.
    Path(Path),
}

impl From<Path> for Topic {
    fn from(path: Path) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for Topic {
    fn from(path: &str) -> Self {
        Self::Path(Path::from(path))
    }
}

pub(crate) type Callback = Rc<dyn Fn(&Change)>;

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    buckets: AHashMap<Topic, Vec<(u64, Callback)>>,
    next_id: u64,
}

impl SubscriberRegistry {
    fn add(&mut self, topic: Topic, callback: Callback) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.buckets.entry(topic).or_default().push((id, callback));
        id
    }

    fn remove(&mut self, topic: &Topic, id: u64) -> bool {
        let Some(bucket) = self.buckets.get_mut(topic) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|(entry, _)| *entry != id);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            self.buckets.remove(topic);
        }
        removed
    }

    /// Callbacks for a change at `path`: exact-path ones first, then
    /// wildcard ones.
    fn snapshot(&self, path: &Path) -> Vec<Callback> {
        let exact = self.buckets.get(&Topic::Path(path.clone()));
        let all = self.buckets.get(&Topic::All);
        exact
            .into_iter()
            .chain(all)
            .flatten()
            .map(|(_, callback)| Rc::clone(callback))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

pub(crate) fn subscribe(
    registry: &Rc<RefCell<SubscriberRegistry>>,
    topic: Topic,
    callback: Callback,
) -> Subscription {
    tracing::trace!(message = "detective.subscribe", topic = ?topic);
    let id = registry.borrow_mut().add(topic.clone(), callback);
    Subscription {
        registry: Rc::downgrade(registry),
        topic,
        id,
        armed: true,
    }
}

/// Deliver `change` to everyone listening at its path, then to wildcard
/// subscribers.
pub(crate) fn notify(registry: &RefCell<SubscriberRegistry>, change: &Change) {
    let snapshot = registry.borrow().snapshot(&change.property);
    for callback in snapshot {
        callback(change);
    }
}

/// RAII guard for one subscription.
///
/// Dropping the guard unsubscribes. Call [`detach`](Self::detach) to keep
/// the callback registered for as long as the tracked value lives.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RefCell<SubscriberRegistry>>,
    topic: Topic,
    id: u64,
    armed: bool,
}

impl Subscription {
    /// Remove this registration. Repeated calls do nothing.
    pub fn unsubscribe(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry.borrow_mut().remove(&self.topic, self.id);
            tracing::trace!(message = "detective.unsubscribe", topic = ?self.topic, removed);
        }
    }

    /// Whether the callback is still registered through this guard.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.armed && self.registry.strong_count() > 0
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Give up the guard, leaving the callback registered.
    pub fn detach(mut self) {
        self.armed = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn registry() -> Rc<RefCell<SubscriberRegistry>> {
        Rc::new(RefCell::new(SubscriberRegistry::default()))
    }

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Callback {
        let log = Rc::clone(log);
        Rc::new(move |change: &Change| {
            log.borrow_mut().push(format!("{tag}:{}", change.property));
        })
    }

    #[test]
    fn path_subscribers_then_wildcards() {
        let registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _all = subscribe(&registry, Topic::All, recorder(&seen, "all"));
        let _a = subscribe(&registry, Topic::from("a"), recorder(&seen, "a"));
        let _b = subscribe(&registry, Topic::from("b"), recorder(&seen, "b"));

        notify(&registry, &Change::new("a", 1, 2));
        assert_eq!(*seen.borrow(), ["a:a", "all:a"]);
    }

    #[test]
    fn other_paths_are_not_notified() {
        let registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _a = subscribe(&registry, Topic::from("a"), recorder(&seen, "a"));
        notify(&registry, &Change::new("b", 1, 2));
        notify(&registry, &Change::new("a.x", 1, 2));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_is_idempotent_and_exact() {
        let registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut first = subscribe(&registry, Topic::All, recorder(&seen, "first"));
        let _second = subscribe(&registry, Topic::All, recorder(&seen, "second"));

        first.unsubscribe();
        first.unsubscribe();
        assert!(!first.is_active());
        assert_eq!(registry.borrow().len(), 1);

        notify(&registry, &Change::new("a", 1, 2));
        assert_eq!(*seen.borrow(), ["second:a"]);
    }

    #[test]
    fn drop_unsubscribes_and_detach_keeps() {
        let registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        drop(subscribe(&registry, Topic::All, recorder(&seen, "dropped")));
        subscribe(&registry, Topic::All, recorder(&seen, "kept")).detach();

        notify(&registry, &Change::new("a", 1, 2));
        assert_eq!(*seen.borrow(), ["kept:a"]);
    }

    #[test]
    fn unsubscribe_during_dispatch_uses_snapshot() {
        let registry = registry();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot_in_callback = Rc::clone(&slot);
        let calls_in_callback = Rc::clone(&calls);
        let sub = subscribe(
            &registry,
            Topic::All,
            Rc::new(move |_: &Change| {
                calls_in_callback.set(calls_in_callback.get() + 1);
                if let Some(mut sub) = slot_in_callback.borrow_mut().take() {
                    sub.unsubscribe();
                }
            }),
        );
        *slot.borrow_mut() = Some(sub);

        notify(&registry, &Change::new("a", 1, 2));
        notify(&registry, &Change::new("a", 2, 3));
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.borrow().len(), 0);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sub = subscribe(&registry, Topic::All, recorder(&seen, "x"));
        drop(registry);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
