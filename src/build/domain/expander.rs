//! Matrix expansion of build configurations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::BuildConfig;

/// Fully resolved configuration for one matrix job.
///
/// A specification holds every shared setting plus exactly one value for
/// each axis of the build's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobSpec(BTreeMap<String, Value>);

impl JobSpec {
    /// Wraps resolved specification entries.
    #[must_use]
    pub const fn new(entries: BTreeMap<String, Value>) -> Self {
        Self(entries)
    }

    /// Returns the value stored under a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterates over every entry in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Expands a build configuration into per-job specifications.
///
/// Expansion walks the configuration's axes in key order and takes their
/// cross product, with later axes cycling fastest. Shared settings are
/// copied into every specification unchanged, so expansion is fully
/// deterministic for a given configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixExpander;

impl MatrixExpander {
    /// Expands the configuration into one specification per matrix job.
    ///
    /// A configuration with no axes produces no specifications, and an
    /// axis with no values empties the whole product.
    #[must_use]
    pub fn expand(config: &BuildConfig) -> Vec<JobSpec> {
        let mut axes = config.axes().peekable();
        if axes.peek().is_none() {
            return Vec::new();
        }
        let base: BTreeMap<String, Value> = config
            .settings()
            .map(|(key, value)| (key.to_owned(), value.clone()))
            .collect();
        let mut selections = vec![base];
        for (axis, values) in axes {
            let mut expanded =
                Vec::with_capacity(selections.len().saturating_mul(values.len()));
            for selection in &selections {
                for value in values {
                    let mut candidate = selection.clone();
                    candidate.insert(axis.to_owned(), value.clone());
                    expanded.push(candidate);
                }
            }
            selections = expanded;
        }
        selections.into_iter().map(JobSpec::new).collect()
    }
}
