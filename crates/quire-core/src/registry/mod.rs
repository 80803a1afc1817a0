//! # Quire Core Registry
//!
//! Key/value store holding the site configuration and the values the
//! subsystems publish while they initialize (`themes.<name>`,
//! `plugins.<name>`). Values are addressed by dotted paths such as
//! `site.errors.display`, where each segment selects a key of a nested
//! mapping.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Registry shared between the kernel and its components.
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Dotted-path key/value store rooted at a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    root: Map<String, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared handle used by the kernel.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Store `value` at `path`, creating intermediate mappings.
    ///
    /// Any non-mapping value found on the way is replaced by a mapping.
    pub fn set<T: Serialize>(&mut self, path: &str, value: T) -> Result<()> {
        let segments = split_path(path)?;
        let value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| Error::InvalidRegistryPath(path.to_string()))?;
        let mut node = &mut self.root;
        for segment in parents {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced by a mapping"),
            };
        }
        node.insert(last.to_string(), value);
        Ok(())
    }

    /// Value at `path`, if every segment resolves.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = split_path(path).ok()?;
        let (first, rest) = segments.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    /// Value at `path` deserialized into `T`; `None` when missing or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.get(path)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Like [`get_as`](Self::get_as), falling back to `default`.
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get_as(path).unwrap_or(default)
    }

    /// String value at `path`; scalars other than strings are not converted.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Truthiness of the value at `path`.
    ///
    /// Missing, `null`, `false`, `0`, empty strings, `"0"`, `"false"`, `"off"`,
    /// `"no"` and empty collections are false; everything else is true.
    pub fn is_truthy(&self, path: &str) -> bool {
        match self.get(path) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => {
                !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "off" | "no")
            }
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Remove and return the value at `path`.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;
        let mut node = &mut self.root;
        for segment in parents {
            node = node.get_mut(*segment)?.as_object_mut()?;
        }
        node.remove(*last)
    }

    /// Top-level keys in insertion-independent (sorted) order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.root.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(Error::InvalidRegistryPath(path.to_string()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests;
