#![forbid(unsafe_code)]

//! Explicit tracking configuration.
//!
//! A [`Config`] bundles options with the custom detectors and interceptors
//! to install. Unlike the thread-wide [`registry`](crate::registry), it is a
//! plain value: build one per use site, clone it, or share it.

use detective_value::{Container, Value};

use crate::context::ChangeContext;
use crate::detector::{Detection, Detectors};
use crate::error::{Error, Result};
use crate::interceptor::{ChangeMarker, Interceptors};
use crate::options::Options;
use crate::registry;
use crate::tracked::Tracked;

#[derive(Debug, Clone, Default)]
pub struct Config {
    options: Options,
    detectors: Detectors,
    interceptors: Interceptors,
}

impl Config {
    /// Default options and the built-in detectors and interceptors only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options plus everything currently in this thread's registry.
    #[must_use]
    pub fn from_registry() -> Self {
        let (detectors, interceptors) = registry::snapshot();
        Self {
            options: Options::default(),
            detectors,
            interceptors,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Add a detector (see [`Detectors::register`]).
    #[must_use]
    pub fn with_detector<R: Into<Detection> + 'static>(
        mut self,
        name: impl Into<String>,
        detector: impl Fn(&ChangeContext<'_>) -> R + 'static,
    ) -> Self {
        self.detectors.register(name, detector);
        self
    }

    /// Add an interceptor (see [`Interceptors::register`]).
    #[must_use]
    pub fn with_interceptor(
        mut self,
        name: impl Into<String>,
        interceptor: impl Fn(&ChangeContext<'_>) -> Option<ChangeMarker> + 'static,
    ) -> Self {
        self.interceptors.register(name, interceptor);
        self
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    #[must_use]
    pub fn detectors(&self) -> &Detectors {
        &self.detectors
    }

    #[must_use]
    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Start tracking `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NotTrackable`] if `value` is not an object or array.
    pub fn wrap(&self, value: impl Into<Value>) -> Result<Tracked> {
        let container =
            Container::try_from(value.into()).map_err(|value| Error::not_trackable(value.kind()))?;
        Ok(self.track(container))
    }

    /// Start tracking `container`.
    pub fn track(&self, container: impl Into<Container>) -> Tracked {
        Tracked::install(
            container.into(),
            self.options,
            self.detectors.clone(),
            self.interceptors.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
