use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;
use crate::storage::local::LocalStorageProvider;

// Helper function to create PathBuf from str for tests
fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn test_create_dirs_and_read_string() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.create_dir_all(&p("nested/dir"))?;
    assert!(provider.is_dir(&p("nested/dir")));
    assert!(!provider.is_file(&p("nested/dir")));

    fs::write(temp_dir.path().join("nested/dir/page.md"), "# Hello").unwrap();
    assert!(provider.is_file(&p("nested/dir/page.md")));
    assert_eq!(provider.read_to_string(&p("nested/dir/page.md"))?, "# Hello");
    Ok(())
}

#[test]
fn test_absolute_paths_bypass_base() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let other_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let absolute = other_dir.path().join("outside.txt");
    fs::write(&absolute, "x").unwrap();
    assert!(provider.is_file(&absolute));
    assert_eq!(provider.read_to_string(&absolute)?, "x");
    assert!(!provider.is_file(&p("outside.txt")));
    Ok(())
}

#[test]
fn test_read_missing_file_reports_path() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    match provider.read_to_string(Path::new("missing.txt")) {
        Err(Error::StorageSystem(StorageSystemError::Io { operation, path, .. })) => {
            assert_eq!(operation, "read_to_string");
            assert!(path.ends_with("missing.txt"));
        }
        other => panic!("Expected StorageSystemError::Io, got {:?}", other),
    }
}

#[test]
fn test_read_dir_is_sorted() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.create_dir_all(&p("b"))?;
    provider.create_dir_all(&p("a"))?;
    fs::write(temp_dir.path().join("c.txt"), "").unwrap();

    let entries = provider.read_dir(&p(""))?;
    let names: Vec<_> = entries
        .iter()
        .map(|e| e.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a", "b", "c.txt"]);
    Ok(())
}

#[test]
fn test_open_append_appends() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    {
        let mut w = provider.open_append(&p("log.txt"))?;
        w.write_all(b"one\n").unwrap();
    }
    {
        let mut w = provider.open_append(&p("log.txt"))?;
        w.write_all(b"two\n").unwrap();
    }
    assert_eq!(provider.read_to_string(&p("log.txt"))?, "one\ntwo\n");
    Ok(())
}
