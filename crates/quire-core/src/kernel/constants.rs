/// Application name
pub const APP_NAME: &str = "Quire";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the site root directory
pub const ROOT_ENV_VAR: &str = "QUIRE_ROOT";

/// Site directory, relative to the root
pub const SITE_DIR: &str = "site";

/// Configuration directory, relative to the site directory
pub const CONFIG_DIR: &str = "config";

/// Site configuration file name
pub const SITE_CONFIG_FILE: &str = "site.yaml";

/// Log directory, relative to the site directory
pub const LOGS_DIR: &str = "logs";

/// Cache directory, relative to the site directory
pub const CACHE_DIR: &str = "cache";

/// Themes directory, relative to the site directory
pub const THEMES_DIR: &str = "themes";

/// Plugins directory, relative to the site directory
pub const PLUGINS_DIR: &str = "plugins";

/// Pages directory, relative to the site directory
pub const PAGES_DIR: &str = "pages";

/// Error log file name inside the log directory
pub const ERROR_LOG_FILE: &str = "errors.log";

/// Registry key the site configuration is stored under
pub const SITE_KEY: &str = "site";
