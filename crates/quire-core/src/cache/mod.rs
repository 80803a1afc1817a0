//! # Quire Core Cache
//!
//! Keyed in-memory store for values the site computes repeatedly. Entries
//! expire after the configured lifetime; a disabled cache accepts writes
//! as no-ops and never returns hits. The on-disk cache directory is
//! created during initialization so other components can place files
//! below it.
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::Result;
use crate::registry::Registry;
use crate::storage::error::StorageSystemError;
use crate::storage::{SitePaths, StorageProvider};

/// Default entry lifetime: one week.
pub const DEFAULT_LIFETIME_SECS: u64 = 604_800;

/// Default namespace of cache entries and cache directory name.
pub const DEFAULT_PREFIX: &str = "quire";

/// Cache settings read from `site.cache.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub lifetime: Duration,
    pub prefix: String,
}

impl CacheSettings {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            enabled: registry.get_or("site.cache.enabled", true),
            lifetime: Duration::from_secs(registry.get_or("site.cache.lifetime", DEFAULT_LIFETIME_SECS)),
            prefix: registry
                .get_as::<String>("site.cache.prefix")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            lifetime: Duration::from_secs(DEFAULT_LIFETIME_SECS),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    /// `None` when the lifetime is too long to represent; never expires.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug)]
pub struct CacheManager {
    name: &'static str,
    settings: CacheSettings,
    dir: PathBuf,
    provider: Arc<dyn StorageProvider>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CacheManager {
    pub fn new(settings: CacheSettings, paths: &SitePaths, provider: Arc<dyn StorageProvider>) -> Self {
        let dir = paths.cache().join(&settings.prefix);
        Self {
            name: "CacheManager",
            settings,
            dir,
            provider,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Directory reserved for this cache namespace.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key(&self, id: &str) -> String {
        format!("{}:{}", self.settings.prefix, id)
    }

    /// Cached value for `id`, if present, unexpired and of type `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, id: &str) -> Option<T> {
        if !self.settings.enabled {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(&self.key(id))
            .filter(|entry| entry.is_live(Instant::now()))
            .and_then(|entry| serde_json::from_value(entry.value.clone()).ok())
    }

    pub async fn contains(&self, id: &str) -> bool {
        if !self.settings.enabled {
            return false;
        }
        let entries = self.entries.read().await;
        entries
            .get(&self.key(id))
            .is_some_and(|entry| entry.is_live(Instant::now()))
    }

    /// Store `value` under `id` for the configured lifetime.
    pub async fn save<T: Serialize>(&self, id: &str, value: &T) -> Result<()> {
        self.save_for(id, value, self.settings.lifetime).await
    }

    /// Store `value` under `id` for `lifetime`.
    pub async fn save_for<T: Serialize>(&self, id: &str, value: &T, lifetime: Duration) -> Result<()> {
        if !self.settings.enabled {
            return Ok(());
        }
        let value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        let entry = CacheEntry { value, expires_at: Instant::now().checked_add(lifetime) };
        self.entries.write().await.insert(self.key(id), entry);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.entries.write().await.remove(&self.key(id)).is_some()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl KernelComponent for CacheManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        if !self.provider.is_dir(&self.dir) {
            self.provider.create_dir_all(&self.dir)?;
        }
        log::debug!(
            "Cache ready at {} (enabled: {}, lifetime: {}s)",
            self.dir.display(),
            self.settings.enabled,
            self.settings.lifetime.as_secs()
        );
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.clear().await;
        Ok(())
    }
}
