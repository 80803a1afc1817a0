use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::registry::SharedRegistry;
use crate::storage::{load_document, SitePaths, StorageProvider};

/// Discovers site plugins and keeps the enabled ones in load order.
#[derive(Debug)]
pub struct PluginManager {
    name: &'static str,
    plugins_dir: PathBuf,
    provider: Arc<dyn StorageProvider>,
    registry: SharedRegistry,
    active: RwLock<Vec<PluginManifest>>,
    disabled: RwLock<Vec<String>>,
}

impl PluginManager {
    pub fn new(registry: SharedRegistry, paths: &SitePaths, provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            name: "PluginManager",
            plugins_dir: paths.plugins().to_path_buf(),
            provider,
            registry,
            active: RwLock::new(Vec::new()),
            disabled: RwLock::new(Vec::new()),
        }
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Manifest location for a plugin id.
    pub fn manifest_path(&self, id: &str) -> PathBuf {
        self.plugins_dir.join(id).join(format!("{}.yaml", id))
    }

    /// Read every plugin manifest below the plugins directory.
    ///
    /// Directories without a manifest are skipped.
    pub fn discover(&self) -> Result<Vec<PluginManifest>> {
        if !self.provider.is_dir(&self.plugins_dir) {
            log::debug!("No plugins directory at {}", self.plugins_dir.display());
            return Ok(Vec::new());
        }

        let mut manifests = Vec::new();
        for entry in self.provider.read_dir(&self.plugins_dir)? {
            if !self.provider.is_dir(&entry) {
                continue;
            }
            let Some(id) = entry.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if id.starts_with('.') {
                continue;
            }
            validate_id(&id)?;

            let path = self.manifest_path(&id);
            if !self.provider.is_file(&path) {
                log::warn!("Skipping plugin '{}': no manifest at {}", id, path.display());
                continue;
            }
            let manifest: PluginManifest = load_document(self.provider.as_ref(), &path).map_err(|e| {
                PluginSystemError::ManifestError {
                    path: path.clone(),
                    message: "could not read manifest".to_string(),
                    source: Some(Box::new(e)),
                }
            })?;
            manifests.push(manifest.with_id(&id));
        }
        Ok(manifests)
    }

    /// Enabled plugins in load order.
    pub async fn plugins(&self) -> Vec<PluginManifest> {
        self.active.read().await.clone()
    }

    /// Ids of enabled plugins in load order.
    pub async fn ids(&self) -> Vec<String> {
        self.active.read().await.iter().map(|m| m.id.clone()).collect()
    }

    /// Ids of plugins found on disk but disabled by their manifest.
    pub async fn disabled(&self) -> Vec<String> {
        self.disabled.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<PluginManifest> {
        self.active
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| PluginSystemError::NotFound(id.to_string()).into())
    }

    pub async fn is_enabled(&self, id: &str) -> bool {
        self.active.read().await.iter().any(|m| m.id == id)
    }
}

/// Order by descending priority, then id.
pub fn sort_by_priority(manifests: &mut [PluginManifest]) {
    manifests.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
}

// Ids become registry path segments.
fn validate_id(id: &str) -> Result<()> {
    if id.contains('.') || id.trim().is_empty() {
        return Err(Error::PluginSystem(PluginSystemError::InvalidPluginId {
            plugin_id: id.to_string(),
            reason: "plugin directory names must be non-empty and must not contain '.'".to_string(),
        }));
    }
    Ok(())
}

#[async_trait]
impl KernelComponent for PluginManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        let (mut active, disabled): (Vec<_>, Vec<_>) =
            self.discover()?.into_iter().partition(|m| m.enabled);
        sort_by_priority(&mut active);

        {
            let mut registry = self.registry.write().await;
            for manifest in &active {
                registry.set(&format!("plugins.{}", manifest.id), manifest)?;
            }
        }

        log::info!("Loaded {} plugin(s), {} disabled", active.len(), disabled.len());
        *self.disabled.write().await = disabled.into_iter().map(|m| m.id).collect();
        *self.active.write().await = active;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        for manifest in self.active.read().await.iter() {
            log::debug!("Plugin active: {} v{} (priority {})", manifest.id, manifest.version, manifest.priority);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.active.write().await.clear();
        self.disabled.write().await.clear();
        Ok(())
    }
}
