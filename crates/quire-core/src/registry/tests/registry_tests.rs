use serde_json::json;

use crate::kernel::error::{Error, Result};
use crate::registry::Registry;

#[test]
fn test_set_and_get_nested() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("site", json!({"charset": "utf-8", "errors": {"display": true}}))?;

    assert_eq!(registry.get_str("site.charset"), Some("utf-8"));
    assert_eq!(registry.get_as::<bool>("site.errors.display"), Some(true));
    assert!(registry.has("site.errors"));
    assert!(!registry.has("site.timezone"));
    assert_eq!(registry.get("site.charset.more"), None);
    Ok(())
}

#[test]
fn test_set_creates_intermediate_mappings() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("themes.default.name", "Default")?;

    assert_eq!(registry.get("themes"), Some(&json!({"default": {"name": "Default"}})));
    Ok(())
}

#[test]
fn test_set_replaces_scalar_intermediate() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("site", "placeholder")?;
    registry.set("site.title", "Home")?;

    assert_eq!(registry.get("site"), Some(&json!({"title": "Home"})));
    Ok(())
}

#[test]
fn test_invalid_paths_rejected() {
    let mut registry = Registry::new();
    for path in ["", "site.", ".site", "site..charset"] {
        match registry.set(path, 1) {
            Err(Error::InvalidRegistryPath(p)) => assert_eq!(p, path),
            other => panic!("Expected InvalidRegistryPath for {:?}, got {:?}", path, other),
        }
        assert_eq!(registry.get(path), None);
    }
}

#[test]
fn test_get_or_and_wrong_type() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("site.cache.lifetime", "soon")?;

    assert_eq!(registry.get_or("site.cache.lifetime", 60u64), 60);
    assert_eq!(registry.get_or("site.cache.missing", 30u64), 30);
    assert_eq!(registry.get_as::<String>("site.cache.lifetime").as_deref(), Some("soon"));
    Ok(())
}

#[test]
fn test_truthiness() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("a", true)?;
    registry.set("b", false)?;
    registry.set("c", 1)?;
    registry.set("d", 0)?;
    registry.set("e", "yes")?;
    registry.set("f", "false")?;
    registry.set("g", "")?;
    registry.set("h", json!(null))?;

    assert!(registry.is_truthy("a"));
    assert!(!registry.is_truthy("b"));
    assert!(registry.is_truthy("c"));
    assert!(!registry.is_truthy("d"));
    assert!(registry.is_truthy("e"));
    assert!(!registry.is_truthy("f"));
    assert!(!registry.is_truthy("g"));
    assert!(!registry.is_truthy("h"));
    assert!(!registry.is_truthy("missing"));
    Ok(())
}

#[test]
fn test_remove_and_keys() -> Result<()> {
    let mut registry = Registry::new();
    registry.set("site.title", "Home")?;
    registry.set("plugins.blog.enabled", true)?;

    assert_eq!(registry.keys(), vec!["plugins".to_string(), "site".to_string()]);
    assert_eq!(registry.remove("plugins.blog"), Some(json!({"enabled": true})));
    assert_eq!(registry.remove("plugins.blog"), None);
    assert_eq!(registry.get("plugins"), Some(&json!({})));
    Ok(())
}
