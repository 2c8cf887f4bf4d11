// Reconciliation primitives shared by every resource module
//
// A module run is one fetch-decide-act-report cycle: fetch the existing
// remote state, decide with is_subset whether the desired state is already
// satisfied, issue at most one write, report a ModuleResult.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// Desired presence of a remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceState {
    #[default]
    Present,
    Absent,
}

impl FromStr for ResourceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(ResourceState::Present),
            "absent" => Ok(ResourceState::Absent),
            _ => Err(format!("invalid state '{}' (expected present or absent)", s)),
        }
    }
}

/// Result of a single module invocation
#[derive(Debug, Clone, Serialize)]
pub struct ModuleResult {
    pub changed: bool,

    /// Resource-specific payload fields, flattened into the result object
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl ModuleResult {
    /// A result where nothing changed
    pub fn unchanged() -> Self {
        ModuleResult {
            changed: false,
            data: HashMap::new(),
        }
    }

    /// A result where a write was issued
    pub fn changed() -> Self {
        ModuleResult {
            changed: true,
            data: HashMap::new(),
        }
    }

    /// Attach a payload field
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// Directional structural containment: is every field of `desired` already
/// represented in `existing`?
///
/// - Objects: every desired key must exist in `existing` with a recursively
///   contained value. Keys present only in `existing` are ignored.
/// - Arrays: equal length, pairwise containment in order.
/// - Scalars: same-type equality, no coercion ("5" does not match 5).
/// - A null desired value is vacuously contained in anything.
pub fn is_subset(desired: &Value, existing: &Value) -> bool {
    match desired {
        Value::Null => true,

        // an empty desired mapping or sequence demands nothing
        Value::Object(map) if map.is_empty() => true,
        Value::Array(seq) if seq.is_empty() => true,

        Value::Object(desired_map) => match existing {
            Value::Object(existing_map) => desired_map.iter().all(|(key, value)| {
                existing_map
                    .get(key)
                    .map(|existing_value| is_subset(value, existing_value))
                    .unwrap_or(false)
            }),
            _ => false,
        },

        Value::Array(desired_seq) => match existing {
            Value::Array(existing_seq) => {
                desired_seq.len() == existing_seq.len()
                    && desired_seq
                        .iter()
                        .zip(existing_seq.iter())
                        .all(|(d, e)| is_subset(d, e))
            }
            _ => false,
        },

        // serde_json equality is already same-type: Number != String
        scalar => scalar == existing,
    }
}

/// Remove keys whose value is an explicit null, recursing into nested
/// objects. Arrays and scalars pass through untouched, so falsy-but-set
/// values (0, false, "") survive. Pruning before serialization keeps the
/// remote service's own defaults for fields the caller never set.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}
