//! Monitor state types
//!
//! The monitor service reports its state as a JSON object mapping monitor
//! identifiers to entries. Entries are validated one by one so a single
//! malformed entry does not poison the whole snapshot.

use crate::stream::TrackedStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A unit of monitoring state held by the monitor service.
///
/// Only `streams` is required. The remaining fields belong to the monitor;
/// absent, null or oddly typed values are kept as `None` instead of
/// rejecting the entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorEntry {
    /// Creation timestamp as reported by the monitor
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Streams tracked by this entry, in monitor order
    pub streams: Vec<TrackedStream>,

    /// Monitor-owned state label
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Monitor-owned error counter
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub error_count: Option<i64>,

    /// Monitor-owned status endpoint
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status_endpoint: Option<String>,
}

impl MonitorEntry {
    /// Entry with the given streams and no monitor metadata
    pub fn with_streams(streams: Vec<TrackedStream>) -> Self {
        Self {
            streams,
            ..Self::default()
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Monitor state could not be interpreted at all
#[derive(Debug, Error)]
pub enum MonitorStateError {
    #[error("monitor state must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// A monitor entry that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub monitor_id: String,
    pub reason: String,
}

/// Validated monitor state keyed by monitor identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorMap {
    entries: BTreeMap<String, MonitorEntry>,
}

impl MonitorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a raw monitor response body.
    ///
    /// Entries that are not objects or lack a well-formed `streams` list
    /// are returned separately and left out of the map.
    pub fn from_value(value: Value) -> Result<(Self, Vec<RejectedEntry>), MonitorStateError> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(MonitorStateError::NotAnObject(json_kind(&other))),
        };

        let mut map = Self::new();
        let mut rejected = Vec::new();

        for (monitor_id, raw) in object {
            match serde_json::from_value::<MonitorEntry>(raw) {
                Ok(entry) => {
                    map.entries.insert(monitor_id, entry);
                }
                Err(e) => rejected.push(RejectedEntry {
                    monitor_id,
                    reason: e.to_string(),
                }),
            }
        }

        Ok((map, rejected))
    }

    pub fn insert(&mut self, monitor_id: impl Into<String>, entry: MonitorEntry) {
        self.entries.insert(monitor_id.into(), entry);
    }

    pub fn get(&self, monitor_id: &str) -> Option<&MonitorEntry> {
        self.entries.get(monitor_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MonitorEntry)> {
        self.entries.iter()
    }

    /// Index of every URL tracked by any entry
    pub fn tracked_urls(&self) -> HashSet<&str> {
        self.entries
            .values()
            .flat_map(|entry| entry.streams.iter().map(|s| s.url.as_str()))
            .collect()
    }
}

impl FromIterator<(String, MonitorEntry)> for MonitorMap {
    fn from_iter<I: IntoIterator<Item = (String, MonitorEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
