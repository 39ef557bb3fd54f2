//! Stream types
//!
//! A stream is identified for synchronization purposes by its playable URL.

use serde::{Deserialize, Serialize};

/// A stream known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Registry-assigned identifier (not used for matching)
    pub id: String,

    /// Playable address of the stream
    pub url: String,
}

impl StreamRecord {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// A stream tracked by a monitor entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedStream {
    /// Monitor-side stream identifier
    pub id: String,

    /// Playable address of the stream
    pub url: String,
}

impl TrackedStream {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

impl std::fmt::Display for StreamRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.id)
    }
}
