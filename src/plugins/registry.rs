use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{JunctionError, JunctionResult};

/// Configuration check for one plugin.
///
/// The plugin implementation lives outside the routing core; the core only
/// calls its config check during index build to turn the opaque `props` blob
/// into a parsed configuration value. A failed check fails the whole build.
pub trait PluginChecker: Send + Sync {
    /// Validate and parse the plugin's props, returning the parsed form
    fn check(&self, name: &str, props: &Value) -> JunctionResult<Value>;
}

/// Accepts any props verbatim. For plugins without structured configuration.
pub struct PassthroughCheck;

impl PluginChecker for PassthroughCheck {
    fn check(&self, _name: &str, props: &Value) -> JunctionResult<Value> {
        Ok(props.clone())
    }
}

/// Explicit registry of plugin config checkers, keyed by plugin name.
///
/// Constructed once at process start and passed by reference into the route
/// table builder; there is no ambient global registration.
#[derive(Default)]
pub struct PluginRegistry {
    checkers: RwLock<HashMap<String, Arc<dyn PluginChecker>>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checker under a plugin name, replacing any previous one
    pub fn register<S: Into<String>>(&self, name: S, checker: Arc<dyn PluginChecker>) {
        let mut checkers = self
            .checkers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        checkers.insert(name.into(), checker);
    }

    /// Look up the checker registered under a plugin name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn PluginChecker>> {
        let checkers = self
            .checkers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        checkers.get(name).cloned()
    }

    /// Whether a checker is registered under the plugin name
    pub fn contains(&self, name: &str) -> bool {
        let checkers = self
            .checkers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        checkers.contains_key(name)
    }

    /// Run the registered config check for a plugin.
    ///
    /// An unregistered plugin name is a configuration error: a declared
    /// plugin without an implementation could otherwise silently vanish from
    /// the execution chain.
    pub fn check(&self, name: &str, props: &Value) -> JunctionResult<Value> {
        let checker = self.lookup(name).ok_or_else(|| {
            JunctionError::config(format!("plugin '{}' has no registered checker", name))
        })?;
        checker.check(name, props)
    }
}
