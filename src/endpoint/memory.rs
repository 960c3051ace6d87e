//! Channel-backed in-memory endpoints.
//!
//! These are real `Source`/`Sink`/`Store` implementations, not mocks: a
//! `MemorySource` is fed through an `UnboundedSender` handle, a
//! `MemorySink` collects deliveries behind a shared `Arc<Mutex<Vec<_>>>`,
//! and a `MemoryDuplex` does both. They back the test suite and are useful
//! for composing relays inside a single process.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::endpoint::{Endpoint, Sink, Source, Store};
use crate::relay::message::Relayable;
use crate::utils::error::RelayResult;

/// Drain up to `max_count` messages from `rx`, waiting at most `timeout`
/// for stragglers. A closed channel ends the fetch early.
async fn drain_bounded<M>(
    rx: &mut mpsc::UnboundedReceiver<M>,
    max_count: usize,
    timeout: Duration,
) -> Vec<M> {
    let mut out = Vec::new();
    if max_count == 0 {
        return out;
    }
    let deadline = Instant::now() + timeout;
    while out.len() < max_count {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(message)) => out.push(message),
            // Channel closed or deadline hit: hand back whatever we have.
            Ok(None) | Err(_) => break,
        }
    }
    out
}

/// Source fed through an in-process channel.
pub struct MemorySource<M> {
    name: String,
    rx: mpsc::UnboundedReceiver<M>,
}

impl<M: Relayable> MemorySource<M> {
    /// Returns the source and the sender used to feed it. Dropping the
    /// sender lets pending fetches finish without waiting out the timeout.
    pub fn new(name: &str) -> (Self, mpsc::UnboundedSender<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.to_string(),
                rx,
            },
            tx,
        )
    }
}

#[async_trait]
impl<M: Relayable> Endpoint for MemorySource<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn close(&mut self) -> RelayResult<()> {
        self.rx.close();
        Ok(())
    }
}

#[async_trait]
impl<M: Relayable> Source<M> for MemorySource<M> {
    async fn get_messages(&mut self, max_count: usize, timeout: Duration) -> RelayResult<Vec<M>> {
        Ok(drain_bounded(&mut self.rx, max_count, timeout).await)
    }
}

/// Sink that collects every delivered batch.
pub struct MemorySink<M> {
    name: String,
    delivered: Arc<Mutex<Vec<M>>>,
}

impl<M: Relayable> MemorySink<M> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of everything delivered so far.
    pub fn delivered(&self) -> Arc<Mutex<Vec<M>>> {
        Arc::clone(&self.delivered)
    }
}

#[async_trait]
impl<M: Relayable> Endpoint for MemorySink<M> {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<M: Relayable> Sink<M> for MemorySink<M> {
    async fn send_messages(&mut self, messages: &[M]) -> RelayResult<()> {
        self.delivered.lock().unwrap().extend_from_slice(messages);
        Ok(())
    }
}

/// Symmetric relay node: fed like a `MemorySource`, collects like a
/// `MemorySink`.
pub struct MemoryDuplex<M> {
    name: String,
    rx: mpsc::UnboundedReceiver<M>,
    delivered: Arc<Mutex<Vec<M>>>,
}

impl<M: Relayable> MemoryDuplex<M> {
    pub fn new(name: &str) -> (Self, mpsc::UnboundedSender<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.to_string(),
                rx,
                delivered: Arc::new(Mutex::new(Vec::new())),
            },
            tx,
        )
    }

    pub fn delivered(&self) -> Arc<Mutex<Vec<M>>> {
        Arc::clone(&self.delivered)
    }
}

#[async_trait]
impl<M: Relayable> Endpoint for MemoryDuplex<M> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn close(&mut self) -> RelayResult<()> {
        self.rx.close();
        Ok(())
    }
}

#[async_trait]
impl<M: Relayable> Source<M> for MemoryDuplex<M> {
    async fn get_messages(&mut self, max_count: usize, timeout: Duration) -> RelayResult<Vec<M>> {
        Ok(drain_bounded(&mut self.rx, max_count, timeout).await)
    }
}

#[async_trait]
impl<M: Relayable> Sink<M> for MemoryDuplex<M> {
    async fn send_messages(&mut self, messages: &[M]) -> RelayResult<()> {
        self.delivered.lock().unwrap().extend_from_slice(messages);
        Ok(())
    }
}

/// Volatile store. Reads are non-draining; `flush` is a no-op.
#[derive(Default)]
pub struct MemoryStore<M> {
    contents: Arc<Mutex<Vec<M>>>,
}

impl<M: Relayable> MemoryStore<M> {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle for seeding or inspecting the store.
    pub fn contents(&self) -> Arc<Mutex<Vec<M>>> {
        Arc::clone(&self.contents)
    }
}

#[async_trait]
impl<M: Relayable> Store<M> for MemoryStore<M> {
    async fn read(&mut self) -> RelayResult<Vec<M>> {
        Ok(self.contents.lock().unwrap().clone())
    }

    async fn write_messages(&mut self, messages: &[M], _flush: bool) -> RelayResult<()> {
        self.contents.lock().unwrap().extend_from_slice(messages);
        Ok(())
    }
}
