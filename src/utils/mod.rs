//! The `utils` module provides shared definitions used across the
//! `relaycore` crate: the error surface and the logging bootstrap.

pub mod error;
pub mod logging;
