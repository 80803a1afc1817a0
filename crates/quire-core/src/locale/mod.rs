//! Text encoding and timezone settings applied during boot.
use std::fmt;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::kernel::error::{Error, Result};

/// Charset used when the site does not configure one.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Internal text encoding requested by `site.charset`.
///
/// Strings are always UTF-8 at runtime; any other charset is recorded as
/// unsupported and left unapplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Unsupported(String),
}

impl Charset {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            _ => Charset::Unsupported(label.trim().to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Charset::Utf8)
    }

    pub fn label(&self) -> &str {
        match self {
            Charset::Utf8 => DEFAULT_CHARSET,
            Charset::Unsupported(label) => label,
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Utf8
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Default timezone of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timezone {
    name: String,
    offset: Option<FixedOffset>,
}

impl Timezone {
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            offset: FixedOffset::east_opt(0),
        }
    }

    /// Timezone name as configured (normalized to `UTC` for UTC aliases).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset from UTC, known for UTC aliases and fixed offsets.
    ///
    /// Region names (`Europe/Kyiv`) have no fixed offset and return `None`.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn is_utc(&self) -> bool {
        self.offset.is_some_and(|o| o.local_minus_utc() == 0)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for Timezone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if matches!(name.to_ascii_uppercase().as_str(), "UTC" | "GMT" | "Z" | "ETC/UTC") {
            return Ok(Self::utc());
        }
        if name.starts_with('+') || name.starts_with('-') {
            let offset = FixedOffset::from_str(name)
                .map_err(|e| Error::Other(format!("Invalid timezone offset '{}': {}", name, e)))?;
            return Ok(Self { name: name.to_string(), offset: Some(offset) });
        }
        if is_region_name(name) {
            return Ok(Self { name: name.to_string(), offset: None });
        }
        Err(Error::Other(format!("Invalid timezone '{}'", s)))
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Area/Location[/Sub], e.g. America/Argentina/Buenos_Aires
fn is_region_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    parts.len() >= 2
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.starts_with(|c: char| c.is_ascii_alphabetic())
                && part.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
        })
}
