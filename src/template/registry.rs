//! Helper registration seam between the formatting layer and a template host

use std::collections::HashMap;
use std::fmt;
use crate::engine::FormatOptions;
use crate::scope::ParentData;
use crate::template::value::HelperValue;
use crate::utils::errors::{IntlError, Result};

/// A template helper
pub trait Helper: Send + Sync {
    /// Invoke with positional `params` and named `hash` arguments inside `scope`
    fn call(&self, scope: &dyn ParentData, params: &[HelperValue], hash: &FormatOptions) -> Result<HelperValue>;
}

/// Anything helpers can be registered with by name
pub trait HelperRegistry {
    fn register_helper(&mut self, name: &str, helper: Box<dyn Helper>);
}

/// In-memory registry for hosts without their own, and for tests
#[derive(Default)]
pub struct HelperTable {
    helpers: HashMap<String, Box<dyn Helper>>,
}

impl HelperTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call the helper registered as `name`
    pub fn invoke(
        &self,
        name: &str,
        scope: &dyn ParentData,
        params: &[HelperValue],
        hash: &FormatOptions,
    ) -> Result<HelperValue> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| IntlError::invalid_argument(format!("Missing helper: {}", name)))?;
        helper.call(scope, params, hash)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl HelperRegistry for HelperTable {
    fn register_helper(&mut self, name: &str, helper: Box<dyn Helper>) {
        self.helpers.insert(name.to_string(), helper);
    }
}

impl fmt::Debug for HelperTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperTable").field("helpers", &self.names()).finish()
    }
}
