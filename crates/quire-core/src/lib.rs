pub mod cache;
pub mod content;
pub mod error_handler;
pub mod kernel;
pub mod locale;
pub mod plugin_system;
pub mod registry;
pub mod session;
pub mod storage;
pub mod themes;

pub use cache::CacheManager;
pub use content::{ContentManager, Page};
pub use error_handler::{DisplayMode, ErrorHandler};
pub use kernel::error::Error as KernelError;
pub use kernel::{development, Application, BootOptions, BootPhase, KernelComponent};
pub use locale::{Charset, Timezone};
pub use plugin_system::{PluginManager, PluginManifest};
pub use registry::{Registry, SharedRegistry};
pub use session::{Session, SharedSession};
pub use storage::{SitePaths, StorageProvider};
pub use themes::ThemeManager;
