#![forbid(unsafe_code)]

//! Thread-wide detector and interceptor registry.
//!
//! [`wrap`](crate::wrap) and [`Config::from_registry`](crate::Config::from_registry)
//! take a snapshot of this registry, so registrations only affect values
//! wrapped afterwards. Built-in detectors and interceptors are not part of
//! the registry; they always run, after the registered ones.

use std::cell::RefCell;

use crate::context::ChangeContext;
use crate::detector::{Detection, Detectors};
use crate::interceptor::{ChangeMarker, Interceptors};

#[derive(Default)]
struct Registry {
    detectors: Detectors,
    interceptors: Interceptors,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Register a detector for every value wrapped from now on by this thread.
/// An existing detector with the same name is replaced in place.
pub fn register_detector<R: Into<Detection> + 'static>(
    name: impl Into<String>,
    detector: impl Fn(&ChangeContext<'_>) -> R + 'static,
) {
    let name = name.into();
    tracing::debug!(message = "detective.registry", action = "register_detector", name = %name);
    REGISTRY.with(|registry| registry.borrow_mut().detectors.register(name, detector));
}

/// Remove every registered detector.
pub fn reset_detectors() {
    tracing::debug!(message = "detective.registry", action = "reset_detectors");
    REGISTRY.with(|registry| registry.borrow_mut().detectors.clear());
}

/// Register an interceptor for every value wrapped from now on by this
/// thread. An existing interceptor with the same name is replaced in place.
pub fn register_interceptor(
    name: impl Into<String>,
    interceptor: impl Fn(&ChangeContext<'_>) -> Option<ChangeMarker> + 'static,
) {
    let name = name.into();
    tracing::debug!(message = "detective.registry", action = "register_interceptor", name = %name);
    REGISTRY.with(|registry| registry.borrow_mut().interceptors.register(name, interceptor));
}

/// Remove every registered interceptor.
pub fn reset_interceptors() {
    tracing::debug!(message = "detective.registry", action = "reset_interceptors");
    REGISTRY.with(|registry| registry.borrow_mut().interceptors.clear());
}

pub(crate) fn snapshot() -> (Detectors, Interceptors) {
    REGISTRY.with(|registry| {
        let registry = registry.borrow();
        (registry.detectors.clone(), registry.interceptors.clone())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    // The test harness runs each test on its own thread, so every test
    // starts with an empty registry.

    #[test]
    fn snapshot_sees_registrations() {
        register_detector("d", |_| false);
        register_interceptor("i", |_| None);
        let (detectors, interceptors) = snapshot();
        assert_eq!(detectors.names().collect::<Vec<_>>(), ["d", "unequal"]);
        assert_eq!(
            interceptors.names().collect::<Vec<_>>(),
            ["i", "initial-property-added"]
        );
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        register_detector("d", |_| false);
        let (before, _) = snapshot();
        reset_detectors();
        register_detector("e", |_| true);
        assert_eq!(before.names().collect::<Vec<_>>(), ["d", "unequal"]);
        assert_eq!(snapshot().0.names().collect::<Vec<_>>(), ["e", "unequal"]);
    }

    #[test]
    fn reset_keeps_builtins() {
        register_interceptor("i", |_| None);
        reset_interceptors();
        let (_, interceptors) = snapshot();
        assert!(interceptors.is_empty());
        assert_eq!(
            interceptors.names().collect::<Vec<_>>(),
            ["initial-property-added"]
        );
    }

    #[traced_test]
    #[test]
    fn registry_changes_are_logged() {
        register_detector("logged", |_| false);
        reset_detectors();
        assert!(logs_contain("detective.registry"));
        assert!(logs_contain("register_detector"));
        assert!(logs_contain("reset_detectors"));
    }
}
