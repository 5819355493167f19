//! Environment access
//!
//! All environment reads go through [`Environment`] so configuration can be
//! resolved against a synthetic mapping in tests.

use std::collections::HashMap;

/// Source of environment variables.
pub trait Environment {
    /// Get a variable value. Returns None if it is unset or empty.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// A value together with the variable it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced {
    pub source: &'static str,
    pub value: String,
}

/// Evaluate `sources` in order and return the first one that is set.
pub fn first_present<E: Environment + ?Sized>(
    env: &E,
    sources: &[&'static str],
) -> Option<Sourced> {
    sources.iter().find_map(|&source| {
        env.var(source).map(|value| Sourced { source, value })
    })
}
