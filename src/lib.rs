//! # relaycore
//!
//! `relaycore` is a generic message-relay engine: a single loop that pulls
//! messages from zero or more sources, applies optional deduplication and
//! content filters, and fans the survivors out to zero or more sinks. It
//! is an extensible base for building concrete relays (topic bridges,
//! protocol adapters) by supplying source/sink implementations.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `relay`: the cycle engine: aggregation, deduplication, filtering, fan-out, run loop.
//! - `endpoint`: the collaborator traits (`Source`, `Sink`, `Duplex`, `Store`) and in-memory implementations.
//! - `persistence`: a durable `Store` backed by `sled`.
//! - `config`: layered file/environment configuration for the CLI.
//! - `utils`: shared error types and the logging bootstrap.

pub mod config;
pub mod endpoint;
pub mod persistence;
pub mod relay;
pub mod utils;
