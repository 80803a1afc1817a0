//! # Quire Core Kernel Errors
//!
//! Defines error types specific to the Quire kernel.
//!
//! [`Error`] is the primary enum covering failures that can abort the
//! startup sequence: a missing or malformed site configuration, a failing
//! boot phase, registry misuse, and the typed errors of the storage and
//! plugin subsystems.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Custom error type for the Quire runtime
#[derive(Debug, ThisError)]
pub enum Error {
    /// The site configuration file does not exist at its expected path.
    #[error("Site config file does not exist: {}", path.display())]
    ConfigMissing { path: PathBuf },

    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Error occurring during a specific boot or lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: BootPhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>, // Can wrap another kernel error or a subsystem error
    },

    /// A dotted registry path was empty or contained an empty segment.
    #[error("Invalid registry path: '{0}'")]
    InvalidRegistryPath(String),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// The phases of the startup sequence that can abort it, in order, followed
/// by the runtime lifecycle phases of kernel components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ThisError)]
pub enum BootPhase {
    #[error("SiteConfig")]
    SiteConfig,
    #[error("ErrorHandler")]
    ErrorHandler,
    #[error("Initialize")]
    Initialize,
    #[error("Start")]
    Start,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper to create an I/O error with context, wrapped as a storage error.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    /// Wraps `self` as the cause of a failure in `phase`.
    pub fn in_phase(self, phase: BootPhase, component_name: Option<&str>, message: impl Into<String>) -> Self {
        Error::KernelLifecycleError {
            phase,
            component_name: component_name.map(str::to_string),
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns the boot phase this error was raised in, if any.
    pub fn phase(&self) -> Option<BootPhase> {
        match self {
            Error::KernelLifecycleError { phase, .. } => Some(*phase),
            Error::ConfigMissing { .. } => Some(BootPhase::SiteConfig),
            _ => None,
        }
    }

    /// True when this error, or any error it wraps, is a missing site config.
    pub fn is_config_missing(&self) -> bool {
        match self {
            Error::ConfigMissing { .. } => true,
            Error::KernelLifecycleError { source: Some(inner), .. } => inner.is_config_missing(),
            _ => false,
        }
    }
}
