//! CLI for relaycore
//!
//! Subcommands:
//! - `run`: drive a store-to-store relay loop from the configuration
//! - `config`: print the effective configuration and exit

use clap::Parser;
use tracing::{error, info};

use relaycore::config::load_config;
use relaycore::persistence::SledStore;
use relaycore::relay::{Message, Relay};
use relaycore::utils::logging;

#[derive(Parser)]
#[command(name = "relaycore")]
enum Command {
    /// Run the relay loop over the configured stores
    Run {
        /// Stop after this many cycles; 0 runs until interrupted
        #[arg(long, default_value_t = 0)]
        max_cycles: u64,

        /// Aggregate and filter but skip the dispatch phase
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    logging::init("info");

    match Command::parse() {
        Command::Run {
            max_cycles,
            dry_run,
        } => {
            if let Err(e) = run_relay(max_cycles, dry_run).await {
                error!("Relay failed: {e}");
                std::process::exit(1);
            }
        }
        Command::Config => match load_config() {
            Ok(settings) => println!("{settings:#?}"),
            Err(e) => {
                error!("Failed to load configuration: {e}");
                std::process::exit(1);
            }
        },
    }
}

async fn run_relay(max_cycles: u64, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_config()?;
    let mut relay: Relay<Message> = Relay::new(settings.relay_config());

    if let Some(path) = &settings.store.in_path {
        relay.add_store_in(SledStore::open(
            path,
            settings.store.ttl_secs,
            settings.store.max_messages,
        )?);
    }
    if let Some(path) = &settings.store.out_path {
        relay.add_store_out(SledStore::open(
            path,
            settings.store.ttl_secs,
            settings.store.max_messages,
        )?);
    }

    // CLI flag wins over the configured cycle limit.
    let max_cycles = if max_cycles > 0 {
        max_cycles
    } else {
        settings.relay.max_cycles
    };

    tokio::select! {
        _ = relay.run(max_cycles, !dry_run) => {
            info!("Relay loop finished.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    relay.close().await;
    Ok(())
}
