use serde::{Deserialize, Serialize};

use crate::error::{JunctionError, JunctionResult};

/// One plugin declaration at some scope (global, backend, route or target).
///
/// Plugin identity for merge and dedup purposes is `name` alone; `kind` is a
/// grouping label and takes no part in precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    /// Plugin kind label
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Opaque plugin-specific configuration blob, parsed by the plugin's
    /// registered config check during index build
    #[serde(default)]
    pub props: serde_json::Value,
    /// Disabled plugins are dropped from the merged chain
    #[serde(default)]
    pub disable: bool,
}

fn default_kind() -> String {
    "gateway".to_string()
}

impl PluginConfig {
    /// Validate plugin configuration
    pub fn validate(&self) -> JunctionResult<()> {
        if self.name.is_empty() {
            return Err(JunctionError::config("plugin has empty name"));
        }
        Ok(())
    }
}
