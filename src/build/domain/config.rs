//! Build configuration normalisation and access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BuildDomainError;

/// Normalised build configuration.
///
/// Keys are trimmed of surrounding whitespace and held in sorted order, so
/// two configurations that differ only in key whitespace or entry order
/// compare equal. When trimming makes two keys collide, the later entry
/// wins. Object values are normalised recursively and array values
/// element-wise; scalar values are kept as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildConfig(BTreeMap<String, Value>);

impl BuildConfig {
    /// Normalises raw configuration entries.
    ///
    /// # Errors
    ///
    /// Returns [`BuildDomainError::EmptyConfigKey`] when any key, at any
    /// nesting depth, is empty after trimming whitespace.
    pub fn new(
        entries: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Self, BuildDomainError> {
        let mut normalised = BTreeMap::new();
        for (key, value) in entries {
            normalised.insert(trim_key(&key)?, normalise_value(value)?);
        }
        Ok(Self(normalised))
    }

    /// Returns the value stored under a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when the configuration holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over every entry in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over the matrix axes in key order.
    ///
    /// An axis is a top-level entry whose value is an array; each element
    /// of the array is one candidate value for that axis.
    pub fn axes(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.0.iter().filter_map(|(key, value)| {
            value
                .as_array()
                .map(|items| (key.as_str(), items.as_slice()))
        })
    }

    /// Iterates over the shared settings in key order.
    ///
    /// A setting is a top-level entry whose value is not an array. Settings
    /// are copied verbatim into every expanded job specification.
    pub fn settings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_array())
            .map(|(key, value)| (key.as_str(), value))
    }
}

fn trim_key(key: &str) -> Result<String, BuildDomainError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(BuildDomainError::EmptyConfigKey);
    }
    Ok(trimmed.to_owned())
}

fn normalise_value(value: Value) -> Result<Value, BuildDomainError> {
    match value {
        Value::Object(entries) => {
            let mut normalised = serde_json::Map::new();
            for (key, inner) in entries {
                normalised.insert(trim_key(&key)?, normalise_value(inner)?);
            }
            Ok(Value::Object(normalised))
        }
        Value::Array(items) => {
            let mut normalised = Vec::with_capacity(items.len());
            for item in items {
                normalised.push(normalise_value(item)?);
            }
            Ok(Value::Array(normalised))
        }
        other => Ok(other),
    }
}
