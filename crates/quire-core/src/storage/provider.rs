use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::kernel::error::Result;

/// Filesystem operations the kernel and subsystems depend on
pub trait StorageProvider: Send + Sync + Debug {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all its parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read a file to a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List all entries in a directory
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Open a file for appending, creating it if missing
    fn open_append(&self, path: &Path) -> Result<Box<dyn Write + Send>>;
}
