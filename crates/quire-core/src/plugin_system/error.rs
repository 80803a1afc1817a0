//! # Quire Core Plugin System Errors
//!
//! Errors raised while discovering site plugins: unreadable or invalid
//! manifests, plugin directory names that cannot be used as registry keys,
//! and lookups of unknown plugins.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin manifest error for '{}': {message}", path.display())]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid plugin id '{plugin_id}': {reason}")]
    InvalidPluginId {
        plugin_id: String,
        reason: String,
    },

    #[error("Plugin '{0}' is not loaded")]
    NotFound(String),
}
