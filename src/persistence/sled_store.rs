//! Store backed by `sled`
//!
//! Messages are JSON-encoded and keyed by write time plus a UUID suffix,
//! so chronological scans and TTL-based cleanup both work off the key
//! alone.
//!
//! Configuration options supported:
//! - `ttl_seconds`: optional time-to-live; expired messages are removed
//!   during `read`
//! - `max_messages`: optional retention cap; when exceeded the oldest
//!   messages are removed during writes

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::Db;
use uuid::Uuid;

use crate::endpoint::Store;
use crate::relay::message::Relayable;
use crate::utils::error::RelayResult;

pub struct SledStore {
    db: Db,
    ttl_seconds: Option<i64>,
    max_messages: Option<usize>,
}

impl SledStore {
    /// Open or create a sled database at `path` with the given policy.
    pub fn open(
        path: &str,
        ttl_seconds: Option<i64>,
        max_messages: Option<usize>,
    ) -> RelayResult<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            ttl_seconds,
            max_messages,
        })
    }

    /// Remove entries whose key timestamp is older than the TTL.
    fn cleanup_expired(&self) -> RelayResult<()> {
        if let Some(ttl) = self.ttl_seconds {
            let expiry_time = Utc::now().timestamp_millis() - ttl * 1000;

            let old_keys: Vec<_> = self
                .db
                .iter()
                .filter_map(|res| res.ok())
                .filter_map(|(key_bytes, _)| {
                    if let Ok(key_str) = std::str::from_utf8(&key_bytes) {
                        if let Some((ts_str, _)) = key_str.split_once('_') {
                            if let Ok(ts) = ts_str.parse::<i64>() {
                                if ts < expiry_time {
                                    return Some(key_bytes);
                                }
                            }
                        }
                    }
                    None
                })
                .collect();

            for key in old_keys {
                self.db.remove(key)?;
            }
        }
        Ok(())
    }

    /// Drop the oldest entries beyond the retention cap.
    fn trim_excess(&self) -> RelayResult<()> {
        if let Some(max) = self.max_messages {
            let total = self.db.len();
            if total > max {
                let excess = total - max;
                let keys_to_delete: Vec<_> = self
                    .db
                    .iter()
                    .take(excess)
                    .filter_map(|entry| entry.ok().map(|(k, _)| k))
                    .collect();

                for key in keys_to_delete {
                    self.db.remove(key)?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<M> Store<M> for SledStore
where
    M: Relayable + Serialize + DeserializeOwned,
{
    /// Load every stored message in chronological order, honoring the TTL.
    /// Entries that no longer decode are skipped rather than failing the
    /// whole read.
    async fn read(&mut self) -> RelayResult<Vec<M>> {
        self.cleanup_expired()?;
        Ok(self
            .db
            .iter()
            .filter_map(|res| res.ok())
            .filter_map(|(_, val)| serde_json::from_slice(&val).ok())
            .collect())
    }

    async fn write_messages(&mut self, messages: &[M], flush: bool) -> RelayResult<()> {
        let timestamp = Utc::now().timestamp_millis();
        for message in messages {
            let serialized = serde_json::to_vec(message)?;
            let key = format!("{:020}_{}", timestamp, Uuid::new_v4());
            self.db.insert(key.as_bytes(), serialized)?;
        }

        self.trim_excess()?;

        if flush {
            self.db.flush()?;
        }
        Ok(())
    }

    async fn close(&mut self) -> RelayResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("max_messages", &self.max_messages)
            .finish()
    }
}
