//! Page lookup below the site's pages directory.
//!
//! A page with slug `blog/first-post` lives at
//! `<pages>/blog/first-post/page.md`; the empty slug resolves to the main
//! page configured by `site.pages.main`.
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::registry::Registry;
use crate::storage::{SitePaths, StorageProvider};

/// Main page used when `site.pages.main` is not set.
pub const DEFAULT_MAIN_PAGE: &str = "home";

/// File name of a page inside its directory.
pub const PAGE_FILE: &str = "page.md";

/// Raw page source as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub slug: String,
    pub path: PathBuf,
    pub source: String,
}

#[derive(Debug)]
pub struct ContentManager {
    name: &'static str,
    pages_dir: PathBuf,
    main_page: String,
    provider: Arc<dyn StorageProvider>,
}

impl ContentManager {
    pub fn new(main_page: impl Into<String>, paths: &SitePaths, provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            name: "ContentManager",
            pages_dir: paths.pages().to_path_buf(),
            main_page: main_page.into(),
            provider,
        }
    }

    /// Main page configured by `site.pages.main`, or [`DEFAULT_MAIN_PAGE`].
    pub fn configured_main_page(registry: &Registry) -> String {
        registry
            .get_as::<String>("site.pages.main")
            .map(|s| s.trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MAIN_PAGE.to_string())
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    pub fn main_page(&self) -> &str {
        &self.main_page
    }

    /// Normalized slug for a request path: surrounding slashes removed,
    /// empty mapped to the main page.
    pub fn normalize_slug(&self, url: &str) -> String {
        let trimmed = url.trim().trim_matches('/');
        if trimmed.is_empty() {
            self.main_page.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// File path of the page for `url`; `None` if the slug would leave the pages directory.
    pub fn page_path(&self, url: &str) -> Option<PathBuf> {
        let slug = self.normalize_slug(url);
        let rel = Path::new(&slug);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.pages_dir.join(rel).join(PAGE_FILE))
    }

    pub fn page_exists(&self, url: &str) -> bool {
        self.page_path(url).is_some_and(|p| self.provider.is_file(&p))
    }

    /// Read the page for `url`.
    pub fn read_page(&self, url: &str) -> Result<Page> {
        let slug = self.normalize_slug(url);
        let path = self
            .page_path(url)
            .ok_or_else(|| Error::Other(format!("Invalid page slug '{}'", slug)))?;
        if !self.provider.is_file(&path) {
            return Err(Error::Other(format!("Page '{}' not found at {}", slug, path.display())));
        }
        let source = self.provider.read_to_string(&path)?;
        Ok(Page { slug, path, source })
    }
}

#[async_trait]
impl KernelComponent for ContentManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        if !self.provider.is_dir(&self.pages_dir) {
            self.provider.create_dir_all(&self.pages_dir)?;
        }
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.page_exists("") {
            log::warn!("Main page '{}' does not exist", self.main_page);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
