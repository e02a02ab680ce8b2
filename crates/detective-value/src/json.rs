#![forbid(unsafe_code)]

//! Conversions to and from `serde_json::Value`.
//!
//! JSON has no `undefined`, no opaque host values, and no cycles. Those map
//! to `null` on the way out; non-finite numbers do too.

use serde_json::Value as Json;

use crate::key::Key;
use crate::value::{Array, Object, Value};

/// Integral numbers up to 2^53 serialize as JSON integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::from(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from).collect::<Array>()),
            Json::Object(map) => Self::Object(map.into_iter().collect::<Object>()),
        }
    }
}

impl Value {
    /// Snapshot this value as JSON.
    #[must_use]
    pub fn to_json(&self) -> Json {
        to_json(self, &mut Vec::new())
    }
}

fn to_json(value: &Value, seen: &mut Vec<usize>) -> Json {
    match value {
        Value::Undefined | Value::Null | Value::Opaque(_) => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => Json::from(*n as i64),
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.to_string()),
        Value::Array(array) => {
            let addr = array.addr();
            if seen.contains(&addr) {
                return Json::Null;
            }
            seen.push(addr);
            let items = array.to_vec().iter().map(|v| to_json(v, seen)).collect();
            seen.pop();
            Json::Array(items)
        }
        Value::Object(object) => {
            let addr = object.addr();
            if seen.contains(&addr) {
                return Json::Null;
            }
            seen.push(addr);
            let mut map = serde_json::Map::new();
            for (key, value) in object.entries() {
                // Symbol keys have no JSON spelling.
                if let Key::Name(name) = key {
                    map.insert(name, to_json(&value, seen));
                }
            }
            seen.pop();
            Json::Object(map)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
