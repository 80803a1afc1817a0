use std::path::Path;
use semver::Version;
use serde_json::json;

use crate::storage::ConfigFormat;
use crate::plugin_system::manifest::PluginManifest;

fn parse(yaml: &str) -> crate::kernel::error::Result<PluginManifest> {
    ConfigFormat::Yaml.parse(yaml, Path::new("blog.yaml"))
}

#[test]
fn test_minimal_manifest_defaults() {
    let manifest = parse("version: 1.2.0\n").expect("minimal manifest should parse").with_id("blog");
    assert_eq!(manifest.id, "blog");
    assert_eq!(manifest.name, "blog");
    assert_eq!(manifest.version, Version::new(1, 2, 0));
    assert!(manifest.enabled);
    assert_eq!(manifest.priority, 0);
    assert!(manifest.settings.is_empty());
}

#[test]
fn test_full_manifest_keeps_extra_settings() {
    let yaml = "name: Blog\nversion: 2.0.0-beta.1\ndescription: Posts\nauthor: Jane\nenabled: false\npriority: 50\nposts_per_page: 10\n";
    let manifest = parse(yaml).expect("full manifest should parse").with_id("blog");
    assert_eq!(manifest.name, "Blog");
    assert_eq!(manifest.version.pre.as_str(), "beta.1");
    assert_eq!(manifest.author.as_deref(), Some("Jane"));
    assert!(!manifest.enabled);
    assert_eq!(manifest.priority, 50);
    assert_eq!(manifest.settings.get("posts_per_page"), Some(&json!(10)));
}

#[test]
fn test_missing_or_bad_version_rejected() {
    assert!(parse("name: Blog\n").is_err());
    assert!(parse("version: not-a-version\n").is_err());
}

#[test]
fn test_new_manifest() {
    let manifest = PluginManifest::new("seo", Version::new(0, 1, 0));
    assert_eq!(manifest.name, "seo");
    assert!(manifest.enabled);
}
