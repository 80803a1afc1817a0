use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse `data` into `T` using this format. `path` is only used for error context.
    pub fn parse<T: DeserializeOwned>(&self, data: &str, path: &Path) -> Result<T> {
        let parsed: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>> = match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(Into::into),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(Into::into),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(Into::into),
        };
        parsed.map_err(|source| {
            StorageSystemError::DeserializationError {
                path: path.to_path_buf(),
                format: self.extension().to_string(),
                source,
            }
            .into()
        })
    }
}

/// Read and parse a structured document, failing with [`Error::ConfigMissing`]
/// when the file does not exist.
pub fn load_document<T, P>(provider: &P, path: &Path) -> Result<T>
where
    T: DeserializeOwned,
    P: StorageProvider + ?Sized,
{
    let (format, content) = read_document(provider, path)?;
    format.parse(&content, path)
}

/// Load a configuration file that must hold a mapping at its root.
///
/// An empty document is treated as an empty mapping.
pub fn load_config_value<P>(provider: &P, path: &Path) -> Result<Value>
where
    P: StorageProvider + ?Sized,
{
    let (format, content) = read_document(provider, path)?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    match format.parse::<Value>(&content, path)? {
        value @ Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Default::default())),
        other => Err(StorageSystemError::InvalidConfig {
            path: path.to_path_buf(),
            reason: format!("expected a mapping at the document root, found {}", value_kind(&other)),
        }
        .into()),
    }
}

fn read_document<P>(provider: &P, path: &Path) -> Result<(ConfigFormat, String)>
where
    P: StorageProvider + ?Sized,
{
    if !provider.is_file(path) {
        return Err(Error::ConfigMissing { path: path.to_path_buf() });
    }

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;
    let content = provider.read_to_string(path)?;
    Ok((format, content))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
