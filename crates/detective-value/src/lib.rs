#![forbid(unsafe_code)]

//! Value model for detective: a dynamic, shared object graph.
//!
//! Containers ([`Object`], [`Array`]) are reference-counted handles with
//! interior mutability. Cloning a [`Value`] that holds a container clones the
//! handle, so every clone reads and writes the same storage. This is what lets
//! a tracking wrapper forward writes to the caller's value without copying it.
//!
//! # Invariants
//!
//! 1. Container handles never deep-copy on clone.
//! 2. `Value: PartialEq` is [`same_value`]: primitives by value, containers
//!    and opaques by identity.
//! 3. No container borrow outlives a single accessor call, so callbacks may
//!    freely re-enter the graph.

pub mod container;
pub mod equality;
#[cfg(feature = "serde")]
pub mod json;
pub mod key;
pub mod value;

pub use container::Container;
pub use equality::{loose_equals, same_value};
pub use key::{Key, MAX_ARRAY_INDEX, Symbol};
pub use value::{Array, Object, Opaque, Value, ValueKind};
