#![forbid(unsafe_code)]

//! Detectors: predicates deciding whether a mutation is a reportable change.
//!
//! Custom detectors run in registration order, then the built-in
//! [`unequal`] detector. Every detector runs for every mutation that was not
//! intercepted. Each positive outcome produces a [`Change`]; within one
//! mutation only the first change per path is kept.

use std::fmt;
use std::rc::Rc;

use detective_value::{loose_equals, same_value};
use indexmap::IndexMap;

use crate::change::Change;
use crate::context::ChangeContext;

/// A detector's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    NoChange,
    /// Record the mutation as described by the context.
    Change,
    /// Record this pre-built change instead.
    Report(Change),
}

impl From<bool> for Detection {
    fn from(changed: bool) -> Self {
        if changed { Self::Change } else { Self::NoChange }
    }
}

impl From<Option<Change>> for Detection {
    fn from(change: Option<Change>) -> Self {
        change.map_or(Self::NoChange, Self::Report)
    }
}

pub type Detector = Rc<dyn Fn(&ChangeContext<'_>) -> Detection>;

type BuiltinDetector = fn(&ChangeContext<'_>) -> Detection;

const BUILTIN_DETECTORS: &[(&str, BuiltinDetector)] = &[("unequal", unequal)];

/// Reports a change when `current` differs from `previous`: by identity in
/// strict mode, structurally otherwise (recursing only with deep detection).
#[must_use]
pub fn unequal(ctx: &ChangeContext<'_>) -> Detection {
    let equal = if ctx.options.strict_comparison {
        same_value(ctx.current, ctx.previous)
    } else {
        loose_equals(ctx.current, ctx.previous, ctx.options.deep_detection)
    };
    Detection::from(!equal)
}

/// A named set of custom detectors. The built-ins are implicit.
#[derive(Clone, Default)]
pub struct Detectors {
    custom: IndexMap<String, Detector>,
}

impl Detectors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `detector` under `name`, replacing (in place) any detector
    /// already registered under that name.
    ///
    /// The detector may return anything convertible to [`Detection`]:
    /// a `bool`, an `Option<Change>`, or a `Detection`.
    pub fn register<R: Into<Detection> + 'static>(
        &mut self,
        name: impl Into<String>,
        detector: impl Fn(&ChangeContext<'_>) -> R + 'static,
    ) {
        let erased = higher_ranked(move |ctx| detector(ctx).into());
        self.custom.insert(name.into(), Rc::new(erased));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.custom.shift_remove(name).is_some()
    }

    /// Drop every custom detector.
    pub fn clear(&mut self) {
        self.custom.clear();
    }

    /// Names in evaluation order, built-ins included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.custom
            .keys()
            .map(String::as_str)
            .chain(BUILTIN_DETECTORS.iter().map(|(name, _)| *name))
    }

    /// Number of custom detectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }

    /// Run every detector and collect the changes to record, at most one
    /// per path, in detector order.
    #[must_use]
    pub fn detect(&self, ctx: &ChangeContext<'_>) -> Vec<Change> {
        let custom = self.custom.values().map(|detector| detector(ctx));
        let builtin = BUILTIN_DETECTORS.iter().map(|(_, detector)| detector(ctx));

        let mut changes: Vec<Change> = Vec::new();
        for detection in custom.chain(builtin) {
            let change = match detection {
                Detection::NoChange => continue,
                Detection::Change => ctx.to_change(),
                Detection::Report(change) => change,
            };
            if changes.iter().all(|c| c.property != change.property) {
                changes.push(change);
            }
        }
        changes
    }
}

/// Pins a closure to the higher-ranked signature `Detector` needs.
fn higher_ranked<F>(detector: F) -> F
where
    F: Fn(&ChangeContext<'_>) -> Detection,
{
    detector
}

impl fmt::Debug for Detectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use crate::options::Options;
    use crate::path::Path;
    use detective_value::{Container, Key, Object, Value};
    use std::cell::Cell;

    fn detect_with(
        detectors: &Detectors,
        options: Options,
        previous: Value,
        current: Value,
    ) -> Vec<Change> {
        let key = Key::from("a");
        let path = Path::from("a");
        let target = Container::Object(Object::new());
        detectors.detect(&ChangeContext {
            current: &current,
            previous: &previous,
            key: &key,
            path: &path,
            target: &target,
            kind: ChangeKind::Changed,
            options: &options,
        })
    }

    fn obj(b: i32) -> Value {
        Value::from(Object::new().with("b", b).with("c", true))
    }

    #[test]
    fn strict_identical_primitive_is_no_change() {
        let changes = detect_with(&Detectors::new(), Options::default(), 42.into(), 42.into());
        assert!(changes.is_empty());
    }

    #[test]
    fn strict_different_primitive_is_change() {
        let changes = detect_with(&Detectors::new(), Options::default(), 12.into(), 42.into());
        assert_eq!(changes, vec![Change::new("a", 12, 42)]);
    }

    #[test]
    fn strict_structural_copy_is_change() {
        let changes = detect_with(&Detectors::new(), Options::default(), obj(42), obj(42));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn loose_structural_copy_is_no_change() {
        let options = Options::default().with_strict_comparison(false);
        assert!(detect_with(&Detectors::new(), options, obj(42), obj(42)).is_empty());
        assert_eq!(
            detect_with(&Detectors::new(), options, obj(42), obj(43)).len(),
            1
        );
    }

    #[test]
    fn loose_shallow_copy_is_change_without_deep_detection() {
        let options = Options::default()
            .with_strict_comparison(false)
            .with_deep_detection(false);
        assert_eq!(
            detect_with(&Detectors::new(), options, obj(42), obj(42)).len(),
            1
        );
    }

    #[test]
    fn agreeing_detectors_record_once_per_path() {
        let mut detectors = Detectors::new();
        detectors.register("always", |_| true);
        let changes = detect_with(&detectors, Options::default(), 1.into(), 2.into());
        assert_eq!(changes, vec![Change::new("a", 1, 2)]);
    }

    #[test]
    fn custom_detector_can_report_its_own_change() {
        let mut detectors = Detectors::new();
        detectors.register("mirror", |ctx: &ChangeContext<'_>| {
            Some(Change::new("mirror", ctx.previous.clone(), ctx.current.clone()))
        });
        let changes = detect_with(&detectors, Options::default(), 1.into(), 2.into());
        assert_eq!(
            changes,
            vec![Change::new("mirror", 1, 2), Change::new("a", 1, 2)]
        );
    }

    #[test]
    fn custom_detector_runs_even_without_change() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut detectors = Detectors::new();
        detectors.register("count", move |_| {
            counter.set(counter.get() + 1);
            false
        });
        assert!(detect_with(&detectors, Options::default(), 1.into(), 1.into()).is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn names_end_with_builtins() {
        let mut detectors = Detectors::new();
        detectors.register("x", |_| false);
        assert_eq!(detectors.names().collect::<Vec<_>>(), ["x", "unequal"]);
        assert_eq!(format!("{detectors:?}"), r#"["x", "unequal"]"#);
    }
}
