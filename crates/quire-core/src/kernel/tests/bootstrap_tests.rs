use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use crate::cache::CacheManager;
use crate::content::ContentManager;
use crate::error_handler::DisplayMode;
use crate::kernel::bootstrap::{Application, BootOptions};
use crate::kernel::error::{BootPhase, Error};
use crate::locale::Charset;
use crate::plugin_system::PluginManager;
use crate::storage::SitePaths;
use crate::themes::ThemeManager;

const EXAMPLE_SITE: &str = "\
title: Example
charset: utf-8
timezone: UTC
errors:
  display: true
";

fn write_site_config(root: &Path, contents: &str) {
    let config_dir = root.join("site/config");
    fs::create_dir_all(&config_dir).expect("Failed to create config directory");
    fs::write(config_dir.join("site.yaml"), contents).expect("Failed to write site config");
}

async fn boot(root: &Path) -> Result<Application, Error> {
    Application::bootstrap(BootOptions::new(SitePaths::from_root(root))).await
}

#[tokio::test]
async fn test_bootstrap_example_site() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let app = boot(root.path()).await.expect("Bootstrap failed");

    {
        let registry = app.registry().read().await;
        assert_eq!(registry.get_str("site.charset"), Some("utf-8"));
        assert_eq!(registry.get_str("site.title"), Some("Example"));
        assert!(registry.is_truthy("site.errors.display"));
    }
    assert_eq!(app.charset(), &Charset::Utf8);
    assert!(app.timezone().is_utc());
    assert!(app.is_development());
    assert_eq!(app.error_handler().mode(), DisplayMode::Development);
    assert!(app.session().lock().await.is_started());
    assert!(app.is_running());

    assert!(root.path().join("site/logs").is_dir());
    assert!(root.path().join("site/pages").is_dir());
}

#[tokio::test]
async fn test_bootstrap_production_mode() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "charset: utf-8\nerrors:\n  display: false\n");

    let app = boot(root.path()).await.expect("Bootstrap failed");
    assert!(!app.is_development());
    assert_eq!(app.error_handler().mode(), DisplayMode::Production);
}

#[tokio::test]
async fn test_missing_config_aborts_before_subsystems() {
    let root = tempdir().expect("Failed to create temp directory");

    let err = boot(root.path()).await.expect_err("Bootstrap should fail without site config");
    assert!(matches!(err, Error::ConfigMissing { .. }), "unexpected error: {err:?}");
    assert!(err.is_config_missing());
    assert_eq!(err.phase(), Some(BootPhase::SiteConfig));

    assert!(!root.path().join("site/logs").exists());
    assert!(!root.path().join("site/cache").exists());
    assert!(!root.path().join("site/pages").exists());
}

#[tokio::test]
async fn test_malformed_config_is_fatal() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "charset: [utf-8\n");

    let err = boot(root.path()).await.expect_err("Malformed config should abort boot");
    assert!(!err.is_config_missing());
    assert_eq!(err.phase(), Some(BootPhase::SiteConfig));
    assert!(!root.path().join("site/logs").exists());
}

#[tokio::test]
async fn test_empty_config_uses_defaults() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "");

    let app = boot(root.path()).await.expect("Bootstrap failed");
    assert!(app.registry().read().await.has("site"));
    assert_eq!(app.charset(), &Charset::Utf8);
    assert!(app.timezone().is_utc());
    assert!(!app.is_development());
}

#[tokio::test]
async fn test_existing_log_directory_is_left_alone() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);
    let logs = root.path().join("site/logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("keep.log"), "previous run\n").unwrap();

    let _app = boot(root.path()).await.expect("Bootstrap failed");
    assert_eq!(fs::read_to_string(logs.join("keep.log")).unwrap(), "previous run\n");
}

#[tokio::test]
async fn test_unsupported_charset_is_a_warning() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "charset: koi8-r\n");

    let app = boot(root.path()).await.expect("Bootstrap should survive an unknown charset");
    assert_eq!(app.charset(), &Charset::Unsupported("koi8-r".to_string()));
    let log = app.take_startup_log();
    assert!(log.warnings().any(|r| r.message.contains("koi8-r")));
}

#[tokio::test]
async fn test_invalid_timezone_falls_back_to_utc() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "timezone: Not A Zone\n");

    let app = boot(root.path()).await.expect("Bootstrap should survive an invalid timezone");
    assert!(app.timezone().is_utc());
    assert_eq!(app.take_startup_log().warnings().count(), 1);
}

#[tokio::test]
async fn test_configured_timezone() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "timezone: Europe/Berlin\n");

    let app = boot(root.path()).await.expect("Bootstrap failed");
    assert_eq!(app.timezone().name(), "Europe/Berlin");
}

#[tokio::test]
async fn test_config_file_override() {
    let root = tempdir().expect("Failed to create temp directory");
    let config = root.path().join("site.json");
    fs::write(&config, r#"{"charset": "utf-8", "errors": {"display": true}}"#).unwrap();

    let options = BootOptions::new(SitePaths::from_root(root.path())).with_config_file(&config);
    assert_eq!(options.config_file(), config);

    let app = Application::bootstrap(options).await.expect("Bootstrap failed");
    assert!(app.is_development());
}

#[tokio::test]
async fn test_subsystems_load_in_order() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let app = boot(root.path()).await.expect("Bootstrap failed");
    assert_eq!(
        app.component_names(),
        vec!["CacheManager", "ThemeManager", "PluginManager", "ContentManager"]
    );
}

#[tokio::test]
async fn test_get_component_returns_the_constructed_instance() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let app = boot(root.path()).await.expect("Bootstrap failed");

    let cache = app.get_component::<CacheManager>().expect("CacheManager should be registered");
    assert!(Arc::ptr_eq(&cache, app.cache()));
    let themes = app.get_component::<ThemeManager>().expect("ThemeManager should be registered");
    assert!(Arc::ptr_eq(&themes, app.themes()));
    let plugins = app.get_component::<PluginManager>().expect("PluginManager should be registered");
    assert!(Arc::ptr_eq(&plugins, app.plugins()));
    let content = app.get_component::<ContentManager>().expect("ContentManager should be registered");
    assert!(Arc::ptr_eq(&content, app.content()));
}

#[tokio::test]
async fn test_subsystem_failure_names_component() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);
    let plugin_dir = root.path().join("site/plugins/broken");
    fs::create_dir_all(&plugin_dir).unwrap();
    fs::write(plugin_dir.join("broken.yaml"), "name: Broken\nversion: not-a-version\n").unwrap();

    let err = boot(root.path()).await.expect_err("Broken plugin manifest should abort boot");
    match err {
        Error::KernelLifecycleError { phase, component_name, .. } => {
            assert_eq!(phase, BootPhase::Initialize);
            assert_eq!(component_name.as_deref(), Some("PluginManager"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Content loads after plugins.
    assert!(!root.path().join("site/pages").exists());
}

#[tokio::test]
async fn test_plugins_published_to_registry() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);
    let plugin_dir = root.path().join("site/plugins/sitemap");
    fs::create_dir_all(&plugin_dir).unwrap();
    fs::write(plugin_dir.join("sitemap.yaml"), "name: Sitemap\nversion: 1.2.0\n").unwrap();

    let app = boot(root.path()).await.expect("Bootstrap failed");
    assert_eq!(app.plugins().ids().await, vec!["sitemap".to_string()]);
    assert_eq!(app.registry().read().await.get_str("plugins.sitemap.name"), Some("Sitemap"));
}

#[tokio::test]
async fn test_shutdown_stops_components_once() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let app = boot(root.path()).await.expect("Bootstrap failed");
    app.cache().save("greeting", &"hello").await.unwrap();
    assert_eq!(app.cache().len().await, 1);

    app.shutdown().await.expect("Shutdown failed");
    assert!(!app.is_running());
    assert_eq!(app.cache().len().await, 0);
    assert!(!app.session().lock().await.is_started());

    app.shutdown().await.expect("Second shutdown should be a no-op");
}

#[tokio::test]
async fn test_startup_log_is_sealed_after_boot() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let app = boot(root.path()).await.expect("Bootstrap failed");

    let mut out = Vec::new();
    let written = app.flush_startup_log(&mut out).expect("Flush failed");
    assert!(written > 0);
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().next().unwrap().contains("Booting Quire"));
    assert!(text.contains("Loaded site config"));

    let rest = app.take_startup_log();
    assert!(rest.is_sealed());
    assert!(rest.is_empty());
}

// The only test in this crate that touches the process-wide instance.
#[tokio::test]
async fn test_instance_is_created_once() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);
    let path = root.path().to_path_buf();
    // The instance is 'static; keep its site on disk.
    std::mem::forget(root);

    assert!(Application::get().is_none());
    assert!(!crate::kernel::development());

    let first = Application::instance(BootOptions::new(SitePaths::from_root(&path)))
        .await
        .expect("First instance() failed");
    let second = Application::instance(BootOptions::new(SitePaths::from_root("/nonexistent")))
        .await
        .expect("Second instance() should reuse the first");

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.paths().root(), path.as_path());
    assert!(crate::kernel::development());
}

// Installs a process-wide panic hook; it chains to the previous one.
#[tokio::test]
async fn test_panic_hook_installed_before_subsystems() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "errors:\n  display: false\n");

    let options = BootOptions::new(SitePaths::from_root(root.path())).with_panic_hook(true);
    let app = Application::bootstrap(options).await.expect("Bootstrap failed");

    let log = app.take_startup_log();
    let position = |needle: &str| {
        log.records()
            .iter()
            .position(|r| r.message.contains(needle))
            .unwrap_or_else(|| panic!("no startup record containing '{needle}'"))
    };
    assert!(position("Panic hook installed") < position("Initializing component: CacheManager"));

    let joined = std::thread::spawn(|| panic!("cache warmup blew up")).join();
    assert!(joined.is_err());

    let errors = fs::read_to_string(app.error_handler().log_file()).expect("errors.log should exist");
    assert!(errors.contains("FATAL"), "errors.log: {errors}");
    assert!(errors.contains("cache warmup blew up"), "errors.log: {errors}");
}

#[tokio::test]
async fn test_panic_hook_is_opt_in() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), EXAMPLE_SITE);

    let options = BootOptions::new(SitePaths::from_root(root.path()));
    assert!(!options.installs_panic_hook());
    let app = Application::bootstrap(options).await.expect("Bootstrap failed");
    assert!(!app.take_startup_log().records().iter().any(|r| r.message.contains("Panic hook")));
}

#[tokio::test]
async fn test_theme_outside_themes_dir_aborts_boot() {
    let root = tempdir().expect("Failed to create temp directory");
    write_site_config(root.path(), "theme: ../config\n");

    let err = boot(root.path()).await.expect_err("Escaping theme name should abort boot");
    match err {
        Error::KernelLifecycleError { phase, component_name, .. } => {
            assert_eq!(phase, BootPhase::Initialize);
            assert_eq!(component_name.as_deref(), Some("ThemeManager"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
