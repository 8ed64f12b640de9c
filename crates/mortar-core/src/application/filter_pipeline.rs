//! Filter registry and pipeline.
//!
//! `{{ name | trim | truncate: 10 }}` applies `trim` then `truncate`.
//! A failing step is reported and skipped: the value passes through that
//! step unchanged and the remaining filters still run.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::application::ports::{ArgumentError, Filter};
use crate::domain::{FilterSpec, Value, unquote};

/// Why one filter step did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFailure {
    Unknown { name: String },
    Rejected { name: String, error: ArgumentError },
}

#[derive(Default, Clone)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under all of its names. Later registrations
    /// replace earlier ones with the same name.
    pub fn register(&mut self, filter: Arc<dyn Filter>) {
        for name in filter.names() {
            self.filters.insert((*name).to_owned(), Arc::clone(&filter));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names (aliases included), sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply one filter.
    pub fn apply(&self, value: Value, spec: &FilterSpec) -> Result<Value, (Value, FilterFailure)> {
        let Some(filter) = self.get(&spec.name) else {
            return Err((
                value,
                FilterFailure::Unknown {
                    name: spec.name.clone(),
                },
            ));
        };

        let args: Vec<String> = spec
            .args
            .iter()
            .map(|a| unquote(a.trim()).unwrap_or(a.trim()).to_owned())
            .collect();

        trace!(filter = %spec.name, args = ?args, "Applying filter");
        // Filters take the value by move; keep a copy to pass through on failure.
        match filter.apply(value.clone(), &args) {
            Ok(out) => Ok(out),
            Err(error) => Err((
                value,
                FilterFailure::Rejected {
                    name: spec.name.clone(),
                    error,
                },
            )),
        }
    }

    /// Apply filters left to right, collecting failures.
    pub fn apply_chain(&self, mut value: Value, specs: &[FilterSpec]) -> (Value, Vec<FilterFailure>) {
        let mut failures = Vec::new();
        for spec in specs {
            value = match self.apply(value, spec) {
                Ok(out) => out,
                Err((unchanged, failure)) => {
                    failures.push(failure);
                    unchanged
                }
            };
        }
        (value, failures)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("names", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
