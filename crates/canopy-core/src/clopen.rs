//! Host-owned clopen (collapsed/open) map.
//!
//! A [`ClopenMap`] is a cheap-to-clone handle onto one shared map. The host
//! creates it, hands a clone to the engine, and keeps its own clone for
//! persistence; the map outlives every tree snapshot and the engine never
//! clears it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::key::NodeKey;

/// Shared mapping from node id to expanded (`true`) or collapsed (`false`).
#[derive(Debug, Clone, Default)]
pub struct ClopenMap {
    inner: Arc<Mutex<BTreeMap<NodeKey, bool>>>,
}

impl ClopenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map pre-populated with persisted entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (NodeKey, bool)>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(entries.into_iter().collect())),
        }
    }

    /// Parse a persisted JSON object of `{ "id": bool }` entries.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<NodeKey, bool> = serde_json::from_str(s)?;
        Ok(Self::from_entries(entries))
    }

    /// Render the current entries as a JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries())
    }

    /// Record the state of `key`.
    pub fn set(&self, key: &NodeKey, open: bool) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(key.clone(), open);
        }
    }

    /// The stored state of `key`, if any.
    pub fn get(&self, key: &NodeKey) -> Option<bool> {
        self.inner
            .lock()
            .ok()
            .and_then(|map| map.get(key).copied())
    }

    /// Whether `key` is stored as open.
    pub fn is_open(&self, key: &NodeKey) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Record `false` for `key` unless an entry already exists.
    pub fn set_default_closed(&self, key: &NodeKey) {
        if let Ok(mut map) = self.inner.lock() {
            map.entry(key.clone()).or_insert(false);
        }
    }

    /// A copy of all entries.
    pub fn entries(&self) -> BTreeMap<NodeKey, bool> {
        self.inner
            .lock()
            .map(|map| map.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
