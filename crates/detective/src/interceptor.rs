#![forbid(unsafe_code)]

//! Interceptors: predicates that may suppress a mutation before detection.
//!
//! # Composition
//!
//! Custom interceptors run in registration order, then the built-ins. Each
//! answers [`ChangeMarker::IsChange`], [`ChangeMarker::NoChange`], or abstains
//! with `None`. The last answer wins; the mutation is suppressed iff that
//! answer is `NoChange`. Since built-ins run last, a custom interceptor cannot
//! override a built-in `NoChange`.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::change::ChangeKind;
use crate::context::ChangeContext;

/// An interceptor's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMarker {
    IsChange,
    NoChange,
}

pub type Interceptor = Rc<dyn Fn(&ChangeContext<'_>) -> Option<ChangeMarker>>;

type BuiltinInterceptor = fn(&ChangeContext<'_>) -> Option<ChangeMarker>;

const BUILTIN_INTERCEPTORS: &[(&str, BuiltinInterceptor)] =
    &[("initial-property-added", initial_property_added)];

/// Suppresses the add step of an assignment to a property that already
/// holds a value, so that only genuinely new properties are reported as
/// added.
#[must_use]
pub fn initial_property_added(ctx: &ChangeContext<'_>) -> Option<ChangeMarker> {
    (ctx.kind == ChangeKind::Added
        && ctx.previous.is_undefined()
        && !ctx.target.get(ctx.key).is_undefined())
    .then_some(ChangeMarker::NoChange)
}

/// A named set of custom interceptors. The built-ins are implicit.
#[derive(Clone, Default)]
pub struct Interceptors {
    custom: IndexMap<String, Interceptor>,
}

impl Interceptors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `interceptor` under `name`, replacing (in place) any
    /// interceptor already registered under that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        interceptor: impl Fn(&ChangeContext<'_>) -> Option<ChangeMarker> + 'static,
    ) {
        self.custom.insert(name.into(), Rc::new(interceptor));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.custom.shift_remove(name).is_some()
    }

    /// Drop every custom interceptor.
    pub fn clear(&mut self) {
        self.custom.clear();
    }

    /// Names in evaluation order, built-ins included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.custom
            .keys()
            .map(String::as_str)
            .chain(BUILTIN_INTERCEPTORS.iter().map(|(name, _)| *name))
    }

    /// Number of custom interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }

    /// Run every interceptor and return the last non-abstaining answer.
    #[must_use]
    pub fn verdict(&self, ctx: &ChangeContext<'_>) -> Option<ChangeMarker> {
        let custom = self.custom.values().map(|interceptor| interceptor(ctx));
        let builtin = BUILTIN_INTERCEPTORS
            .iter()
            .map(|(_, interceptor)| interceptor(ctx));
        custom.chain(builtin).fold(None, |verdict, answer| answer.or(verdict))
    }

    #[must_use]
    pub fn suppresses(&self, ctx: &ChangeContext<'_>) -> bool {
        self.verdict(ctx) == Some(ChangeMarker::NoChange)
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
