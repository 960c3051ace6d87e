use std::time::Duration;

use serde::Deserialize;

use crate::relay::engine::RelayConfig;
use crate::relay::filter::MetadataRules;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the relay engine and the durable stores the
/// CLI wires in.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub relay: RelaySettings,
    pub store: StoreSettings,
}

/// Configuration settings for the relay engine.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub name: String,
    pub description: String,
    /// Per-cycle cap on source-contributed messages.
    pub count: usize,
    pub timeout_secs: u64,
    pub sleep_secs: u64,
    /// Hint for specializations; the base engine ignores it.
    pub threads: usize,
    pub deduplicate: bool,
    pub filter_last_one: bool,
    pub verbose: bool,
    /// 0 runs until interrupted.
    pub max_cycles: u64,
    pub filter_metadata: Option<MetadataRules>,
}

/// Configuration settings for the durable stores.
///
/// Paths left unset mean the corresponding store is not attached.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub in_path: Option<String>,
    pub out_path: Option<String>,
    pub ttl_secs: Option<i64>,
    pub max_messages: Option<usize>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub relay: Option<PartialRelaySettings>,
    pub store: Option<PartialStoreSettings>,
}

/// Partial relay settings.
#[derive(Debug, Deserialize)]
pub struct PartialRelaySettings {
    pub name: Option<String>,
    pub description: Option<String>,
    pub count: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub sleep_secs: Option<u64>,
    pub threads: Option<usize>,
    pub deduplicate: Option<bool>,
    pub filter_last_one: Option<bool>,
    pub verbose: Option<bool>,
    pub max_cycles: Option<u64>,
    pub filter_metadata: Option<MetadataRules>,
}

/// Partial store settings.
#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub in_path: Option<String>,
    pub out_path: Option<String>,
    pub ttl_secs: Option<i64>,
    pub max_messages: Option<usize>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            relay: RelaySettings {
                name: "relay".to_string(),
                description: "store-to-store message relay".to_string(),
                count: 1,
                timeout_secs: 5,
                sleep_secs: 5,
                threads: 1,
                deduplicate: false,
                filter_last_one: false,
                verbose: false,
                max_cycles: 0,
                filter_metadata: None,
            },
            store: StoreSettings {
                in_path: None,
                out_path: None,
                ttl_secs: None,
                max_messages: None,
            },
        }
    }
}

impl Settings {
    /// Map the file/env settings onto the engine's immutable configuration.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            name: self.relay.name.clone(),
            description: self.relay.description.clone(),
            count: self.relay.count,
            timeout: Duration::from_secs(self.relay.timeout_secs),
            threads: self.relay.threads,
            sleep_period: Duration::from_secs(self.relay.sleep_secs),
            deduplicate: self.relay.deduplicate,
            filter_metadata: self.relay.filter_metadata.clone(),
            filter_last_one: self.relay.filter_last_one,
            verbose: self.relay.verbose,
        }
    }
}
