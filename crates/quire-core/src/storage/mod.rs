pub mod config;
pub mod error;
pub mod local;
pub mod paths;
pub mod provider;

pub use config::{ConfigFormat, load_config_value, load_document};
pub use error::StorageSystemError;
pub use local::LocalStorageProvider;
pub use paths::SitePaths;
pub use provider::StorageProvider;

#[cfg(test)]
mod tests;
