use std::env;
use std::path::{Path, PathBuf};

use crate::kernel::constants;

/// Directory layout of a site, resolved from a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    root: PathBuf,
    site: PathBuf,
    config: PathBuf,
    logs: PathBuf,
    cache: PathBuf,
    themes: PathBuf,
    plugins: PathBuf,
    pages: PathBuf,
}

impl SitePaths {
    /// Resolve the standard layout below `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let site = root.join(constants::SITE_DIR);
        Self {
            config: site.join(constants::CONFIG_DIR),
            logs: site.join(constants::LOGS_DIR),
            cache: site.join(constants::CACHE_DIR),
            themes: site.join(constants::THEMES_DIR),
            plugins: site.join(constants::PLUGINS_DIR),
            pages: site.join(constants::PAGES_DIR),
            site,
            root,
        }
    }

    /// Resolve from `QUIRE_ROOT`, falling back to the current directory.
    pub fn from_env() -> Self {
        let root = env::var_os(constants::ROOT_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_root(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site(&self) -> &Path {
        &self.site
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Path of the site configuration file.
    pub fn site_config_file(&self) -> PathBuf {
        self.config.join(constants::SITE_CONFIG_FILE)
    }

    pub fn logs(&self) -> &Path {
        &self.logs
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    pub fn themes(&self) -> &Path {
        &self.themes
    }

    pub fn plugins(&self) -> &Path {
        &self.plugins
    }

    pub fn pages(&self) -> &Path {
        &self.pages
    }
}
