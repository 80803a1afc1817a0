use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_enabled() -> bool {
    true
}

/// Contents of `<plugins>/<id>/<id>.yaml`.
///
/// Keys other than the ones below are kept in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Directory name of the plugin; not read from the file.
    #[serde(skip)]
    pub id: String,

    /// Human-readable name; defaults to the id.
    #[serde(default)]
    pub name: String,

    pub version: Version,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Higher priorities load first.
    #[serde(default)]
    pub priority: i32,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl PluginManifest {
    pub fn new(id: &str, version: Version) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            version,
            description: String::new(),
            author: None,
            enabled: true,
            priority: 0,
            settings: Map::new(),
        }
    }

    /// Attach the directory id, filling in the name when the file had none.
    pub(crate) fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        if self.name.trim().is_empty() {
            self.name = id.to_string();
        }
        self
    }
}
