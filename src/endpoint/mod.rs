//! Collaborator interfaces the relay engine calls.
//!
//! The engine is payload- and transport-agnostic: it only requires the
//! small capability traits below. Concrete relays supply implementations
//! (message-queue clients, file readers, and so on); this crate ships an
//! in-memory family for tests and composition, plus a sled-backed `Store`
//! in the `persistence` module.
//!
//! All traits are object-safe so the engine can hold heterogeneous
//! topologies as `Box<dyn Source>` / `Box<dyn Sink>` / `Box<dyn Store>`.

use std::time::Duration;

use async_trait::async_trait;

use crate::relay::message::Relayable;
use crate::utils::error::RelayResult;

pub mod memory;

#[cfg(test)]
mod tests;

/// Common surface of named endpoints.
///
/// `delete_topic` is administrative cleanup (expected idempotent) and
/// `close` releases underlying resources. Both default to no-ops for
/// endpoints that have nothing to tear down.
#[async_trait]
pub trait Endpoint: Send {
    fn name(&self) -> &str;

    async fn delete_topic(&mut self) -> RelayResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> RelayResult<()> {
        Ok(())
    }
}

/// A collaborator the engine pulls messages from.
#[async_trait]
pub trait Source<M: Relayable>: Endpoint {
    /// Fetch up to `max_count` pending messages, blocking at most
    /// `timeout`. Returning fewer than requested, or none at all, is not
    /// an error.
    async fn get_messages(&mut self, max_count: usize, timeout: Duration) -> RelayResult<Vec<M>>;
}

/// A collaborator the engine pushes messages to.
#[async_trait]
pub trait Sink<M: Relayable>: Endpoint {
    /// Best-effort batch delivery; failure semantics are owned by the sink.
    async fn send_messages(&mut self, messages: &[M]) -> RelayResult<()>;
}

/// An endpoint acting as both source and sink within the same cycle.
pub trait Duplex<M: Relayable>: Source<M> + Sink<M> {}

impl<T, M: Relayable> Duplex<M> for T where T: Source<M> + Sink<M> {}

/// A durable collaborator supporting bulk read and flush-on-write.
#[async_trait]
pub trait Store<M: Relayable>: Send {
    /// Return all currently available messages. Unlike `Source` fetches,
    /// reads are not bounded by the per-cycle cap.
    async fn read(&mut self) -> RelayResult<Vec<M>>;

    /// Persist a batch. `flush` forces a durability point before returning.
    async fn write_messages(&mut self, messages: &[M], flush: bool) -> RelayResult<()>;

    async fn close(&mut self) -> RelayResult<()> {
        Ok(())
    }
}
