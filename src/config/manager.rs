use anyhow::Result;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::GatewayConfig;
use crate::plugins::PluginRegistry;
use crate::protocol::ProtocolRegistry;
use crate::router::RouteTable;

/// Configuration manager with hot-reload support.
///
/// Owns the route table: every successful (re)load parses the file, builds a
/// fresh index off to the side and swaps it in atomically. A failed parse or
/// build leaves the served index untouched - the engine favors availability
/// over freshness.
pub struct ConfigManager {
    table: Arc<RouteTable>,
    config_path: PathBuf,
    _watcher: Option<RecommendedWatcher>,
}

impl ConfigManager {
    /// Create a new configuration manager from an initial config file
    pub async fn new<P: AsRef<Path>>(
        config_path: P,
        protocols: Arc<ProtocolRegistry>,
        plugins: Arc<PluginRegistry>,
    ) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = GatewayConfig::from_file_with_env(&config_path).await?;
        let table = Arc::new(RouteTable::build(&config, protocols, plugins)?);

        Ok(ConfigManager {
            table,
            config_path,
            _watcher: None,
        })
    }

    /// Get a handle to the route table serving the current index
    pub fn table(&self) -> Arc<RouteTable> {
        Arc::clone(&self.table)
    }

    /// Start watching for configuration file changes
    pub async fn start_hot_reload(&mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(100);
        let table = Arc::clone(&self.table);
        let config_path = self.config_path.clone();

        // Create file watcher
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("Failed to send file change event: {}", e);
                    }
                }
                Err(e) => error!("File watch error: {}", e),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        // Watch the config file and its directory
        watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
        if let Some(parent) = config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        info!("Started watching config file: {:?}", config_path);

        // Spawn task to handle file change events
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = handle_config_change(&event, &table, &config_path).await {
                    error!("Failed to handle config change: {}", e);
                }
            }
        });

        self._watcher = Some(watcher);
        Ok(())
    }

    /// Manually reload configuration from file
    pub async fn reload(&self) -> Result<()> {
        info!(
            "Manually reloading configuration from {:?}",
            self.config_path
        );

        let config = GatewayConfig::from_file_with_env(&self.config_path).await?;
        self.table.reload(&config)?;
        Ok(())
    }
}

/// Handle configuration file change events
async fn handle_config_change(
    event: &Event,
    table: &Arc<RouteTable>,
    config_path: &Path,
) -> Result<()> {
    use notify::EventKind;

    // Only handle write/modify events for the config file
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return Ok(());
    }

    // Check if the event is for our config file
    let config_file_changed = event
        .paths
        .iter()
        .any(|path| path == config_path || (path.is_dir() && config_path.starts_with(path)));

    if !config_file_changed {
        return Ok(());
    }

    debug!("Config file change detected: {:?}", event);

    // Add a small delay to allow file write to complete
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Parse and rebuild; either step failing keeps the current index serving
    match GatewayConfig::from_file_with_env(config_path).await {
        Ok(new_config) => match table.reload(&new_config) {
            Ok(()) => info!("Configuration hot-reloaded successfully"),
            Err(e) => warn!(
                "Failed to rebuild route index (keeping current): {}",
                e
            ),
        },
        Err(e) => {
            warn!(
                "Failed to hot-reload configuration (keeping current): {}",
                e
            );
        }
    }

    Ok(())
}
