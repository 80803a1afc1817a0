use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::cache::{CacheManager, CacheSettings};
use crate::content::ContentManager;
use crate::error_handler::{install_panic_hook, DisplayMode, ErrorHandler};
use crate::kernel::component::{DependencyRegistry, KernelComponent};
use crate::kernel::constants;
use crate::kernel::error::{BootPhase, Error, Result};
use crate::kernel::startup_log::StartupLog;
use crate::locale::{Charset, Timezone};
use crate::plugin_system::PluginManager;
use crate::registry::{Registry, SharedRegistry};
use crate::session::{Session, SharedSession};
use crate::storage::{load_config_value, LocalStorageProvider, SitePaths, StorageProvider};
use crate::themes::ThemeManager;

static INSTANCE: OnceCell<Application> = OnceCell::const_new();

/// Where the application finds its site.
#[derive(Debug, Clone)]
pub struct BootOptions {
    paths: SitePaths,
    config_file: Option<PathBuf>,
    panic_hook: bool,
}

impl BootOptions {
    pub fn new(paths: SitePaths) -> Self {
        Self { paths, config_file: None, panic_hook: false }
    }

    /// Site rooted at `QUIRE_ROOT` or the current directory.
    pub fn from_env() -> Self {
        Self::new(SitePaths::from_env())
    }

    /// Read the site config from `path` instead of `<config>/site.yaml`.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Route panics to the error handler as soon as it is built, so
    /// panics in the remaining boot steps reach the error log.
    pub fn with_panic_hook(mut self, install: bool) -> Self {
        self.panic_hook = install;
        self
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    pub fn installs_panic_hook(&self) -> bool {
        self.panic_hook
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.paths.site_config_file())
    }
}

/// The initialized application context.
///
/// Built by [`Application::bootstrap`], or once per process by
/// [`Application::instance`]. It cannot be cloned:
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<quire_core::Application>();
/// ```
pub struct Application {
    paths: SitePaths,
    provider: Arc<dyn StorageProvider>,
    registry: SharedRegistry,
    charset: Charset,
    timezone: Timezone,
    error_handler: Arc<ErrorHandler>,
    session: SharedSession,
    components: DependencyRegistry,
    cache: Arc<CacheManager>,
    themes: Arc<ThemeManager>,
    plugins: Arc<PluginManager>,
    content: Arc<ContentManager>,
    startup_log: Mutex<StartupLog>,
    running: AtomicBool,
}

impl Application {
    /// The process-wide application, booted on first call.
    ///
    /// Later calls return the same instance and ignore `options`. If the
    /// boot fails the error is returned and the next call tries again.
    pub async fn instance(options: BootOptions) -> Result<&'static Application> {
        INSTANCE.get_or_try_init(|| Self::bootstrap(options)).await
    }

    /// The process-wide application, if it has been booted.
    pub fn get() -> Option<&'static Application> {
        INSTANCE.get()
    }

    /// Run the startup sequence and return the initialized context.
    pub async fn bootstrap(options: BootOptions) -> Result<Self> {
        let mut startup_log = StartupLog::new();
        startup_log.info(format!("Booting {} v{}", constants::APP_NAME, constants::APP_VERSION));

        let paths = options.paths().clone();
        let provider: Arc<dyn StorageProvider> =
            Arc::new(LocalStorageProvider::new(paths.root().to_path_buf()));

        let registry = load_site_config(&options, provider.as_ref(), &mut startup_log)?;
        let charset = configure_encoding(&registry, &mut startup_log);
        let error_handler = build_error_handler(&registry, &paths, &provider, &mut startup_log)?;
        if options.installs_panic_hook() {
            install_panic_hook(error_handler.clone());
            startup_log.debug("Panic hook installed");
        }
        let timezone = configure_timezone(&registry, &mut startup_log);

        let mut session = Session::new();
        startup_log.debug(format!("Session {} started", session.start()));

        let registry = registry.into_shared();
        let subsystems = Subsystems::construct(&registry, &paths, &provider).await;
        subsystems.initialize(&mut startup_log).await?;
        subsystems.start(&mut startup_log).await?;

        startup_log.info(format!(
            "{} ready (development: {})",
            constants::APP_NAME,
            error_handler.is_development()
        ));
        startup_log.seal();

        let Subsystems { components, cache, themes, plugins, content } = subsystems;
        Ok(Self {
            paths,
            provider,
            registry,
            charset,
            timezone,
            error_handler,
            session: Arc::new(tokio::sync::Mutex::new(session)),
            components,
            cache,
            themes,
            plugins,
            content,
            startup_log: Mutex::new(startup_log),
            running: AtomicBool::new(true),
        })
    }

    /// Stop all components in reverse initialization order.
    ///
    /// Only the first call does anything; it stops at the first component
    /// that fails.
    pub async fn shutdown(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        log::info!("Shutting down components...");
        for component in self.components.in_order().iter().rev() {
            log::debug!("Stopping component: {}", component.name());
            if let Err(e) = component.stop().await {
                log::error!("Error stopping component {}: {}", component.name(), e);
                return Err(e.in_phase(BootPhase::Shutdown, Some(component.name()), "Component failed to stop"));
            }
        }
        self.session.lock().await.destroy();
        log::info!("Component shutdown complete.");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn timezone(&self) -> &Timezone {
        &self.timezone
    }

    pub fn error_handler(&self) -> &Arc<ErrorHandler> {
        &self.error_handler
    }

    /// True when `site.errors.display` was set.
    pub fn is_development(&self) -> bool {
        self.error_handler.is_development()
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn themes(&self) -> &Arc<ThemeManager> {
        &self.themes
    }

    pub fn plugins(&self) -> &Arc<PluginManager> {
        &self.plugins
    }

    pub fn content(&self) -> &Arc<ContentManager> {
        &self.content
    }

    /// Gets a specific component instance by its concrete type T.
    pub fn get_component<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.components.get_concrete::<T>()
    }

    /// Component names in initialization order.
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.names()
    }

    /// Take the startup transcript, leaving an empty sealed log behind.
    pub fn take_startup_log(&self) -> StartupLog {
        let mut guard = self.startup_log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut taken = std::mem::take(&mut *guard);
        guard.seal();
        taken.seal();
        taken
    }

    /// Write the startup transcript to `out`.
    pub fn flush_startup_log<W: Write>(&self, out: &mut W) -> io::Result<usize> {
        self.take_startup_log().flush(out)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("root", &self.paths.root())
            .field("charset", &self.charset)
            .field("timezone", &self.timezone)
            .field("mode", &self.error_handler.mode())
            .field("components", &self.components.names())
            .field("running", &self.is_running())
            .finish()
    }
}

/// The four subsystems, constructed in load order.
struct Subsystems {
    components: DependencyRegistry,
    cache: Arc<CacheManager>,
    themes: Arc<ThemeManager>,
    plugins: Arc<PluginManager>,
    content: Arc<ContentManager>,
}

impl Subsystems {
    async fn construct(registry: &SharedRegistry, paths: &SitePaths, provider: &Arc<dyn StorageProvider>) -> Self {
        let (cache_settings, theme, main_page) = {
            let reg = registry.read().await;
            (
                CacheSettings::from_registry(&reg),
                ThemeManager::configured_theme(&reg),
                ContentManager::configured_main_page(&reg),
            )
        };

        let mut components = DependencyRegistry::new();

        let cache = Arc::new(CacheManager::new(cache_settings, paths, provider.clone()));
        components.register_instance(cache.clone());

        let themes = Arc::new(ThemeManager::new(registry.clone(), theme, paths, provider.clone()));
        components.register_instance(themes.clone());

        let plugins = Arc::new(PluginManager::new(registry.clone(), paths, provider.clone()));
        components.register_instance(plugins.clone());

        let content = Arc::new(ContentManager::new(main_page, paths, provider.clone()));
        components.register_instance(content.clone());

        Self { components, cache, themes, plugins, content }
    }

    async fn initialize(&self, startup_log: &mut StartupLog) -> Result<()> {
        for component in self.components.in_order() {
            startup_log.debug(format!("Initializing component: {}", component.name()));
            component.initialize().await.map_err(|e| {
                e.in_phase(BootPhase::Initialize, Some(component.name()), "Component failed to initialize")
            })?;
        }
        Ok(())
    }

    async fn start(&self, startup_log: &mut StartupLog) -> Result<()> {
        for component in self.components.in_order() {
            startup_log.debug(format!("Starting component: {}", component.name()));
            component.start().await.map_err(|e| {
                e.in_phase(BootPhase::Start, Some(component.name()), "Component failed to start")
            })?;
        }
        Ok(())
    }
}

fn load_site_config(
    options: &BootOptions,
    provider: &dyn StorageProvider,
    startup_log: &mut StartupLog,
) -> Result<Registry> {
    let mut registry = Registry::new();
    registry.set(constants::SITE_KEY, serde_json::json!({}))?;

    let path = options.config_file();
    let site = match load_config_value(provider, &path) {
        Ok(site) => site,
        Err(e @ Error::ConfigMissing { .. }) => return Err(e),
        Err(e) => return Err(e.in_phase(BootPhase::SiteConfig, None, "Could not load site config")),
    };
    registry.set(constants::SITE_KEY, site)?;
    startup_log.info(format!("Loaded site config from {}", path.display()));
    Ok(registry)
}

// Best-effort: an unsupported charset is reported, never fatal.
fn configure_encoding(registry: &Registry, startup_log: &mut StartupLog) -> Charset {
    let charset = registry
        .get_str("site.charset")
        .map(Charset::from_label)
        .unwrap_or_default();
    if charset.is_supported() {
        startup_log.debug(format!("Internal encoding: {}", charset));
    } else {
        startup_log.warn(format!(
            "Charset '{}' is not supported, text is handled as {}",
            charset,
            Charset::Utf8
        ));
    }
    charset
}

fn build_error_handler(
    registry: &Registry,
    paths: &SitePaths,
    provider: &Arc<dyn StorageProvider>,
    startup_log: &mut StartupLog,
) -> Result<Arc<ErrorHandler>> {
    let mode = DisplayMode::from_display_flag(registry.is_truthy("site.errors.display"));

    if !provider.is_dir(paths.logs()) {
        provider.create_dir_all(paths.logs()).map_err(|e| {
            e.in_phase(BootPhase::ErrorHandler, None, "Could not create log directory")
        })?;
        startup_log.info(format!("Created log directory {}", paths.logs().display()));
    }

    startup_log.debug(format!("Error display mode: {:?}", mode));
    Ok(Arc::new(ErrorHandler::new(mode, paths.logs(), provider.clone())))
}

// Best-effort: a missing or invalid timezone falls back to UTC.
fn configure_timezone(registry: &Registry, startup_log: &mut StartupLog) -> Timezone {
    match registry.get_str("site.timezone") {
        None => {
            startup_log.debug("No timezone configured, using UTC");
            Timezone::utc()
        }
        Some(name) => match name.parse::<Timezone>() {
            Ok(tz) => {
                startup_log.debug(format!("Default timezone: {}", tz));
                tz
            }
            Err(e) => {
                startup_log.warn(format!("{}; using UTC", e));
                Timezone::utc()
            }
        },
    }
}
