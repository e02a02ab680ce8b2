#![forbid(unsafe_code)]

//! Equality helpers used by change detection.
//!
//! - [`same_value`]: identity / primitive equality. `NaN` equals itself and
//!   `0.0` differs from `-0.0`; containers compare by pointer.
//! - [`loose_equals`]: type-aware structural equality, recursing into
//!   containers only when `deep` is set.

use ahash::AHashSet;

use crate::value::Value;

/// Identity comparison: primitives by value, everything else by pointer.
#[must_use]
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan())
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => x.ptr_eq(y),
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        (Value::Opaque(x), Value::Opaque(y)) => x.ptr_eq(y),
        _ => false,
    }
}

/// Structural comparison of `current` against `previous`.
///
/// Rules, in order:
///
/// 1. If either side is `Undefined`/`Null`, equal only if both are the same
///    one of those.
/// 2. Different kinds are unequal.
/// 3. Opaques compare by identity.
/// 4. Primitives compare by value (`NaN` is unequal to itself).
/// 5. Arrays of different length are unequal; otherwise the same array is
///    equal, and distinct arrays are compared element-wise when `deep`.
/// 6. Objects: the same object is equal; distinct objects, when `deep`, are
///    equal if every key of `previous` exists in `current` and every key of
///    `current` compares equal to `previous`'s value.
///
/// Without `deep`, distinct containers are unequal. Cycles are tolerated: a
/// pair of containers already being compared is assumed equal.
#[must_use]
pub fn loose_equals(current: &Value, previous: &Value, deep: bool) -> bool {
    LooseComparison {
        deep,
        in_progress: AHashSet::new(),
    }
    .equals(current, previous)
}

struct LooseComparison {
    deep: bool,
    /// Container address pairs currently on the comparison stack.
    in_progress: AHashSet<(usize, usize)>,
}

impl LooseComparison {
    fn equals(&mut self, current: &Value, previous: &Value) -> bool {
        if current.is_nullish() || previous.is_nullish() {
            return current.kind() == previous.kind();
        }
        if current.kind() != previous.kind() {
            return false;
        }
        match (current, previous) {
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                if a.len() != b.len() || !self.deep {
                    return false;
                }
                self.guarded((a.addr(), b.addr()), |this| {
                    a.to_vec()
                        .iter()
                        .zip(b.to_vec().iter())
                        .all(|(x, y)| this.equals(x, y))
                })
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                if !self.deep {
                    return false;
                }
                self.guarded((a.addr(), b.addr()), |this| {
                    b.keys().iter().all(|key| a.contains_key(key))
                        && a.keys()
                            .iter()
                            .all(|key| this.equals(&a.get(key), &b.get(key)))
                })
            }
            _ => false,
        }
    }

    fn guarded(&mut self, pair: (usize, usize), compare: impl FnOnce(&mut Self) -> bool) -> bool {
        if !self.in_progress.insert(pair) {
            return true;
        }
        let result = compare(self);
        self.in_progress.remove(&pair);
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
