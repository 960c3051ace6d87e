//! Message definitions for the relay
//!
//! The engine is generic over the message type rather than fixing a single
//! shape. `Relayable` is the contract a payload must satisfy: structural
//! equality and hashing (so deduplication can treat it as a set member)
//! plus an optional metadata view used by the metadata filter.
//!
//! `String` payloads are supported out of the box; `Message` is the
//! concrete record used by the durable store and the CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Contract for anything the relay can carry.
///
/// Equality is structural, not identity-based. Types without metadata
/// simply inherit the default accessor and are never matched by metadata
/// filter rules.
pub trait Relayable: Clone + Eq + std::hash::Hash + Send + Sync + 'static {
    /// Metadata view used by the metadata filter. `None` means the message
    /// exposes no metadata and is excluded whenever rules are configured.
    fn metadata(&self) -> Option<&BTreeMap<String, String>> {
        None
    }
}

/// Opaque UTF-8 payloads.
impl Relayable for String {}

/// Canonical structured message carried between endpoints.
///
/// Fields:
/// - `topic`: routing name, opaque to the engine
/// - `payload`: JSON-serializable body as a String
/// - `timestamp`: milliseconds since UNIX epoch, set at creation
/// - `metadata`: optional key/value pairs matched by filter rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub payload: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Message {
    pub fn new(topic: &str, payload: &str) -> Self {
        Self {
            topic: topic.to_string(),
            payload: payload.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl Relayable for Message {
    fn metadata(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata.as_ref()
    }
}
