//! # Quire Core Plugin System
//!
//! Site plugins are directories below `<site>/plugins`, each described by
//! a `<id>/<id>.yaml` manifest. The [`PluginManager`] reads them during
//! initialization, keeps the enabled ones ordered by descending priority
//! (ties broken by id), and publishes each manifest to the registry under
//! `plugins.<id>`.
//!
//! - **[`manifest`]**: the [`PluginManifest`] file format.
//! - **[`manager`]**: discovery and ordering.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod error;
pub mod manager;
pub mod manifest;

pub use error::PluginSystemError;
pub use manager::PluginManager;
pub use manifest::PluginManifest;

#[cfg(test)]
mod tests;
