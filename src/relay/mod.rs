//! relay
//!
//! The cycle engine at the center of the crate:
//! - `engine`: the `Relay` type: aggregation, dispatch, run loop, hooks
//! - `message`: the `Relayable` contract and the concrete `Message` record
//! - `dedup`: within-cycle deduplication
//! - `filter`: metadata-rule and last-message-only filters

pub mod dedup;
pub mod engine;
pub mod filter;
pub mod message;

pub use engine::{Relay, RelayConfig, RunState};
pub use message::{Message, Relayable};
