//! # Quire Core Kernel
//!
//! The `kernel` module boots a Quire site into an explicit application
//! context.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application::bootstrap`] runs the ordered
//!   startup sequence (site config, encoding, error handling, timezone,
//!   session, subsystems) and [`Application::instance`] holds the one
//!   process-wide context.
//! - **Component Lifecycle**: subsystems implement
//!   [`KernelComponent`](component::KernelComponent) and are kept in a
//!   [`DependencyRegistry`](component::DependencyRegistry) in load order.
//! - **Startup Diagnostics**: [`StartupLog`](startup_log::StartupLog) captures
//!   what boot reported so the caller can show or drop it.
//! - **Error Handling**: kernel [`Error`](error::Error) and the [`BootPhase`]
//!   a failure happened in.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;
pub mod startup_log;

pub use bootstrap::{Application, BootOptions};
pub use component::{DependencyRegistry, KernelComponent};
pub use error::{BootPhase, Error, Result};
pub use startup_log::{StartupLog, StartupRecord};

/// True when the process-wide application is booted in development mode.
///
/// Returns false before [`Application::instance`] has succeeded.
pub fn development() -> bool {
    Application::get().is_some_and(Application::is_development)
}

#[cfg(test)]
mod tests;
