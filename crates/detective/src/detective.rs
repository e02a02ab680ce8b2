#![forbid(unsafe_code)]

//! The engine handle exposed through [`CHANGE_DETECTIVE`](crate::CHANGE_DETECTIVE).

use std::fmt;
use std::rc::Rc;

use crate::change::Change;
use crate::options::Options;
use crate::path::Path;
use crate::subscription::{self, Subscription, Topic};
use crate::tracked::Shared;

/// Read access to the change log and subscription management for one
/// tracked root.
///
/// Every proxy of a root (nested ones included) hands out a handle to the
/// same state.
#[derive(Clone)]
pub struct Detective {
    shared: Rc<Shared>,
}

impl Detective {
    pub(crate) fn new(shared: Rc<Shared>) -> Self {
        Self { shared }
    }

    /// Call `callback` for every accepted change, after the path
    /// subscribers of that change.
    pub fn subscribe(&self, callback: impl Fn(&Change) + 'static) -> Subscription {
        subscription::subscribe(&self.shared.subscribers, Topic::All, Rc::new(callback))
    }

    /// Call `callback` for accepted changes at exactly `path`.
    pub fn subscribe_at(
        &self,
        path: impl Into<Path>,
        callback: impl Fn(&Change) + 'static,
    ) -> Subscription {
        subscription::subscribe(
            &self.shared.subscribers,
            Topic::Path(path.into()),
            Rc::new(callback),
        )
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.shared.log.borrow().has_changes()
    }

    /// Discard every recorded change. Subscriptions are kept.
    pub fn reset_changes(&self) {
        let mut log = self.shared.log.borrow_mut();
        tracing::debug!(message = "detective.reset", discarded = log.len());
        log.reset();
    }

    /// Every recorded change, oldest first.
    #[must_use]
    pub fn changes(&self) -> Vec<Change> {
        self.shared.log.borrow().changes().to_vec()
    }

    /// Recorded changes at exactly `path`, oldest first.
    #[must_use]
    pub fn changes_at(&self, path: &str) -> Vec<Change> {
        self.shared.log.borrow().changes_at(path).to_vec()
    }

    /// Paths with recorded changes, in order of their first record.
    #[must_use]
    pub fn changed_paths(&self) -> Vec<Path> {
        self.shared.log.borrow().paths().cloned().collect()
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.shared.options
    }

    /// Whether both handles belong to the same tracked root.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for Detective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detective")
            .field("options", &self.shared.options)
            .field("changes", &self.shared.log.borrow().len())
            .field("subscribers", &self.shared.subscribers.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::{CHANGE_DETECTIVE, Config, Object, Options, Path};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing_test::traced_test;

    #[test]
    fn nested_proxies_share_one_handle() {
        let tracked = Config::new().track(Object::new().with("inner", Object::new()));
        let root = tracked.detective();
        let nested = tracked.at("inner").unwrap().detective();
        assert!(root.ptr_eq(&nested));

        let other = Config::new().track(Object::new());
        assert!(!root.ptr_eq(&other.detective()));
    }

    #[test]
    fn handle_via_reserved_key() {
        let tracked = Config::new().track(Object::new().with("a", 1));
        let detective = tracked.get(CHANGE_DETECTIVE).into_detective().unwrap();
        tracked.set("a", 2);
        assert!(detective.has_changes());
        assert_eq!(detective.changed_paths(), [Path::from("a")]);
    }

    #[test]
    fn reset_keeps_subscriptions() {
        let tracked = Config::new().track(Object::new().with("a", 1));
        let detective = tracked.detective();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = detective.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        tracked.set("a", 2);
        detective.reset_changes();
        assert!(!detective.has_changes());
        assert!(detective.changes().is_empty());

        tracked.set("a", 3);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(detective.changes().len(), 1);
    }

    #[test]
    fn options_are_visible() {
        let options = Options::default().with_property_removing(true);
        let tracked = Config::new().with_options(options).track(Object::new());
        assert_eq!(tracked.detective().options(), options);
    }

    #[traced_test]
    #[test]
    fn reset_is_logged() {
        let tracked = Config::new().track(Object::new());
        tracked.detective().reset_changes();
        assert!(logs_contain("detective.reset"));
    }
}
