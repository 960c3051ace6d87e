mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{RelaySettings, Settings, StoreSettings};


/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the relay and store configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        relay: RelaySettings {
            name: partial
                .relay
                .as_ref()
                .and_then(|r| r.name.clone())
                .unwrap_or(default.relay.name),
            description: partial
                .relay
                .as_ref()
                .and_then(|r| r.description.clone())
                .unwrap_or(default.relay.description),
            count: partial
                .relay
                .as_ref()
                .and_then(|r| r.count)
                .unwrap_or(default.relay.count),
            timeout_secs: partial
                .relay
                .as_ref()
                .and_then(|r| r.timeout_secs)
                .unwrap_or(default.relay.timeout_secs),
            sleep_secs: partial
                .relay
                .as_ref()
                .and_then(|r| r.sleep_secs)
                .unwrap_or(default.relay.sleep_secs),
            threads: partial
                .relay
                .as_ref()
                .and_then(|r| r.threads)
                .unwrap_or(default.relay.threads),
            deduplicate: partial
                .relay
                .as_ref()
                .and_then(|r| r.deduplicate)
                .unwrap_or(default.relay.deduplicate),
            filter_last_one: partial
                .relay
                .as_ref()
                .and_then(|r| r.filter_last_one)
                .unwrap_or(default.relay.filter_last_one),
            verbose: partial
                .relay
                .as_ref()
                .and_then(|r| r.verbose)
                .unwrap_or(default.relay.verbose),
            max_cycles: partial
                .relay
                .as_ref()
                .and_then(|r| r.max_cycles)
                .unwrap_or(default.relay.max_cycles),
            filter_metadata: partial
                .relay
                .as_ref()
                .and_then(|r| r.filter_metadata.clone())
                .or(default.relay.filter_metadata),
        },
        store: StoreSettings {
            in_path: partial
                .store
                .as_ref()
                .and_then(|s| s.in_path.clone())
                .or(default.store.in_path),
            out_path: partial
                .store
                .as_ref()
                .and_then(|s| s.out_path.clone())
                .or(default.store.out_path),
            ttl_secs: partial
                .store
                .as_ref()
                .and_then(|s| s.ttl_secs)
                .or(default.store.ttl_secs),
            max_messages: partial
                .store
                .as_ref()
                .and_then(|s| s.max_messages)
                .or(default.store.max_messages),
        },
    })
}
