#![forbid(unsafe_code)]

//! Transparent deep change-tracking.
//!
//! Wrap an object or array and mutate it through the returned [`Tracked`]
//! proxy. Every mutation is forwarded to your value unchanged; mutations
//! that count as changes are recorded in a path-addressed log and delivered
//! to subscribers.
//!
//! ```
//! use detective::{Change, Key, Object, Value, wrap};
//!
//! let raw = Object::new().with("a", 12);
//! let tracked = wrap(raw.clone()).unwrap();
//! tracked.set("a", 42);
//!
//! let detective = tracked.detective();
//! assert_eq!(detective.changes_at("a"), [Change::new("a", 12, 42)]);
//! assert_eq!(raw.get(&Key::from("a")), Value::from(42));
//! ```
//!
//! # Architecture
//!
//! - [`Tracked`]: the proxy. Reads pass through; writes, definitions and
//!   deletes run the pipelines.
//! - [`Interceptors`] then [`Detectors`]: decide whether a mutation is a
//!   change.
//! - [`ChangeLog`]: records accepted changes by path and chronologically.
//! - [`Detective`]: the per-root handle for reading the log and subscribing.
//! - [`Config`] and the thread-wide [`registry`]: which hooks get installed.
//!
//! Everything is single-threaded (`Rc` based).

pub mod change;
pub mod config;
pub mod context;
pub mod detective;
pub mod detector;
pub mod error;
pub mod interceptor;
pub mod log;
pub mod options;
pub mod path;
pub mod registry;
pub mod subscription;
pub mod tracked;

pub use change::{Change, ChangeKind};
pub use config::Config;
pub use context::ChangeContext;
pub use detective::Detective;
pub use detector::{Detection, Detector, Detectors};
pub use error::{Error, Result};
pub use interceptor::{ChangeMarker, Interceptor, Interceptors};
pub use log::ChangeLog;
pub use options::Options;
pub use path::Path;
pub use registry::{register_detector, register_interceptor, reset_detectors, reset_interceptors};
pub use subscription::{Subscription, Topic};
pub use tracked::{CHANGE_DETECTIVE, Member, Tracked};

pub use detective_value::{
    Array, Container, Key, Object, Opaque, Symbol, Value, ValueKind, loose_equals, same_value,
};

/// Track `value` with default options and this thread's registered hooks.
///
/// # Errors
///
/// [`Error::NotTrackable`] if `value` is not an object or array.
pub fn wrap(value: impl Into<Value>) -> Result<Tracked> {
    Config::from_registry().wrap(value)
}

/// Track `value` with `options` and this thread's registered hooks.
///
/// # Errors
///
/// [`Error::NotTrackable`] if `value` is not an object or array.
pub fn wrap_with(value: impl Into<Value>, options: Options) -> Result<Tracked> {
    Config::from_registry().with_options(options).wrap(value)
}
