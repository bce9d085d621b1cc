// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Task Payload Value Object
//!
//! An opaque tree of scalars, sequences, and keyed maps, serializable for
//! transport across the process boundary to a CPU-bound worker (`spec.md`
//! §3.1, §9). Backed by [`serde_json::Value`] rather than a hand-rolled
//! variant tree: the scheduler already treats JSON as its wire format for
//! the sqlite audit sink and the subprocess worker protocol, so the payload
//! type and the transport format are the same thing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap as StdHashMap;

/// Opaque, serializable task input/output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Value);

impl Payload {
    pub fn empty() -> Self {
        Self(Value::Object(Default::default()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a field by name, returning `None` for a non-object payload
    /// or a missing key. The reference task handlers use this to read
    /// optional fields like `iterations` or `duration` with defaults.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_f64(&self, field: &str, default: f64) -> f64 {
        self.get(field).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_u64(&self, field: &str, default: u64) -> u64 {
        self.get(field).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn get_array(&self, field: &str) -> Option<&Vec<Value>> {
        self.get(field).and_then(Value::as_array)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::from_str(s)?))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<StdHashMap<String, Value>> for Payload {
    fn from(map: StdHashMap<String, Value>) -> Self {
        Self(Value::Object(map.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_fields_with_defaults() {
        let payload = Payload::from_value(json!({"iterations": 42}));
        assert_eq!(payload.get_u64("iterations", 1_000_000), 42);
        assert_eq!(payload.get_u64("missing", 7), 7);
    }

    #[test]
    fn round_trips_through_json() {
        let payload = Payload::from_value(json!({"data": [1, 2, "x"]}));
        let s = payload.to_json_string().unwrap();
        let parsed = Payload::from_json_str(&s).unwrap();
        assert_eq!(payload, parsed);
    }
}
