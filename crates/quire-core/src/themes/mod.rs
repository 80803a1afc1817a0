//! Active theme resolution and theme manifest loading.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::registry::{Registry, SharedRegistry};
use crate::storage::{load_config_value, SitePaths, StorageProvider};

/// Theme used when `site.theme` is not set.
pub const DEFAULT_THEME: &str = "default";

/// Extension of template files inside a theme.
pub const TEMPLATE_EXTENSION: &str = "html";

#[derive(Debug)]
pub struct ThemeManager {
    name: &'static str,
    current: String,
    themes_dir: PathBuf,
    provider: Arc<dyn StorageProvider>,
    registry: SharedRegistry,
    manifest: RwLock<Option<Value>>,
}

impl ThemeManager {
    pub fn new(
        registry: SharedRegistry,
        current: impl Into<String>,
        paths: &SitePaths,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            name: "ThemeManager",
            current: current.into(),
            themes_dir: paths.themes().to_path_buf(),
            provider,
            registry,
            manifest: RwLock::new(None),
        }
    }

    /// Theme name configured by `site.theme`, or [`DEFAULT_THEME`].
    pub fn configured_theme(registry: &Registry) -> String {
        registry
            .get_as::<String>("site.theme")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    /// Name of the active theme.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn theme_dir(&self) -> PathBuf {
        self.themes_dir.join(&self.current)
    }

    /// `<themes>/<theme>/<theme>.yaml`
    pub fn manifest_path(&self) -> PathBuf {
        self.theme_dir().join(format!("{}.yaml", self.current))
    }

    /// `<themes>/<theme>/templates/<name>.html`
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.theme_dir()
            .join("templates")
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }

    /// Path of a file inside the active theme; `None` if `relative` would leave it.
    pub fn asset_path(&self, relative: &str) -> Option<PathBuf> {
        resolve_in_theme(&self.theme_dir(), relative)
    }

    pub fn template_exists(&self, name: &str) -> bool {
        self.provider.is_file(&self.template_path(name))
    }

    /// Manifest of the active theme, once loaded.
    pub async fn manifest(&self) -> Option<Value> {
        self.manifest.read().await.clone()
    }

    fn registry_key(&self) -> String {
        format!("themes.{}", self.current)
    }
}

#[async_trait]
impl KernelComponent for ThemeManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        validate_theme_name(&self.current)?;
        let manifest_path = self.manifest_path();
        let manifest = match load_config_value(self.provider.as_ref(), &manifest_path) {
            Ok(value) => value,
            Err(Error::ConfigMissing { .. }) => {
                log::warn!("Theme '{}' has no manifest at {}", self.current, manifest_path.display());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.registry.write().await.set(&self.registry_key(), &manifest)?;
        *self.manifest.write().await = Some(manifest);
        log::debug!("Loaded theme '{}'", self.current);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.provider.is_dir(&self.theme_dir()) {
            log::warn!("Theme directory {} does not exist", self.theme_dir().display());
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}

// Theme names become a directory name and a registry path segment.
fn validate_theme_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(['.', '/', '\\']) {
        return Err(Error::Other(format!(
            "Invalid theme name '{}': must be non-empty and must not contain '.', '/' or '\\'",
            name
        )));
    }
    Ok(())
}

fn resolve_in_theme(theme_dir: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    if rel.is_absolute() || rel.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return None;
    }
    Some(theme_dir.join(rel))
}
