use std::collections::HashMap;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;

/// Length of generated session ids
pub const SESSION_ID_LEN: usize = 32;

/// Session shared between the kernel and request handling.
pub type SharedSession = Arc<Mutex<Session>>;

/// In-process session with a random id and key/value data.
#[derive(Debug, Default)]
pub struct Session {
    id: Option<String>,
    data: HashMap<String, Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the session, generating its id on first call.
    ///
    /// Returns the session id; calling again keeps the existing one.
    pub fn start(&mut self) -> &str {
        self.id.get_or_insert_with(|| {
            let id: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(SESSION_ID_LEN)
                .map(char::from)
                .collect();
            log::debug!("Session started: {}", id);
            id
        })
    }

    pub fn is_started(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Drop all data and the id; the next `start` begins a new session.
    pub fn destroy(&mut self) {
        self.data.clear();
        self.id = None;
    }
}
