use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::plugins::PluginConfig;
use crate::error::{JunctionError, JunctionResult};
use crate::protocol::ProtocolType;

/// Network and protocol identity of one forwarding destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backend {
    /// Backend identifier, referenced by route targets
    pub name: String,
    /// Opaque backend address (host:port or whatever the transport accepts)
    pub address: String,
    /// Network transport, e.g. "tcp"
    #[serde(default = "default_network")]
    pub network: String,
    /// Application protocol; a forwarding handler must be registered for it
    #[serde(default)]
    pub protocol: ProtocolType,
    /// Forwarding timeout in seconds
    pub timeout: Option<u64>,
    /// Free-form routing hints passed through to the transport layer
    #[serde(default)]
    pub hints: HashMap<String, String>,
    /// Backend-scoped plugin list
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

fn default_network() -> String {
    "tcp".to_string()
}

impl Backend {
    /// Validate backend configuration
    pub fn validate(&self) -> JunctionResult<()> {
        if self.name.is_empty() {
            return Err(JunctionError::config("backend has empty name"));
        }

        if self.network.is_empty() {
            return Err(JunctionError::config(format!(
                "backend '{}' has empty network",
                self.name
            )));
        }

        if self.address.is_empty() {
            return Err(JunctionError::config(format!(
                "backend '{}' has empty address",
                self.name
            )));
        }

        for plugin in &self.plugins {
            plugin.validate()?;
        }

        Ok(())
    }

    /// Get the forwarding timeout for this backend
    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(30))
    }
}
