//! Relay engine
//!
//! This module contains the cycle engine responsible for:
//! - aggregating messages from input stores, consumers, and duplex nodes
//! - deduplicating and filtering the aggregated buffer
//! - fanning surviving messages out to producers, duplex nodes, and
//!   output stores
//! - driving the above repeatedly with configurable pacing and an
//!   optional cycle limit
//!
//! Concurrency and usage notes:
//! - Control flow is single-task and cooperative: one cycle completes
//!   fully before the next begins, and no message state is carried
//!   between cycles. The only awaits are collaborator calls and the
//!   inter-cycle sleep.
//! - Cancellation of an unbounded run is the host's job; the expected
//!   shape is `tokio::select!` against a shutdown signal, followed by
//!   `close()` on every exit path.
//! - `threads` in the configuration is a hint reserved for
//!   specializations that parallelize fetching or dispatch; the base
//!   engine does not use it.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::endpoint::{Duplex, Sink, Source, Store};
use crate::relay::dedup;
use crate::relay::filter::{self, MetadataRules};
use crate::relay::message::Relayable;

/// Immutable configuration fixed for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub name: String,
    pub description: String,
    /// Per-cycle cap on messages contributed by consumers and duplex
    /// nodes. Store reads are not capped.
    pub count: usize,
    /// Per-source fetch timeout, passed through to `get_messages`.
    pub timeout: Duration,
    /// Reserved for specializations; unused by the base engine.
    pub threads: usize,
    /// Pause between cycles of the run loop.
    pub sleep_period: Duration,
    pub deduplicate: bool,
    pub filter_metadata: Option<MetadataRules>,
    /// Collapse each cycle's surviving messages to the final one.
    pub filter_last_one: bool,
    /// Narrate per-cycle progress at info level instead of debug.
    pub verbose: bool,
}

impl RelayConfig {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            count: 1,
            timeout: Duration::from_secs(5),
            threads: 1,
            sleep_period: Duration::from_secs(5),
            deduplicate: false,
            filter_metadata: None,
            filter_last_one: false,
            verbose: false,
        }
    }
}

/// Run-loop state. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

type PreHook = Box<dyn FnMut(u64) + Send>;
type PostHook<M> = Box<dyn FnMut(u64, &[M]) + Send>;

/// The relay engine: pulls from sources, filters, fans out to sinks.
///
/// The topology (consumers, producers, duplex nodes, stores) and the
/// configuration are fixed at construction; the only mutable run state is
/// the cycle counter and the loop state. Extension points are the pre- and
/// post-cycle hooks rather than subclassing.
pub struct Relay<M: Relayable> {
    config: RelayConfig,
    consumers: Vec<Box<dyn Source<M>>>,
    producers: Vec<Box<dyn Sink<M>>>,
    duplex: Vec<Box<dyn Duplex<M>>>,
    stores_in: Vec<Box<dyn Store<M>>>,
    stores_out: Vec<Box<dyn Store<M>>>,
    pre_hook: Option<PreHook>,
    post_hook: Option<PostHook<M>>,
    cycle: u64,
    state: RunState,
}

impl<M: Relayable> Relay<M> {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            consumers: Vec::new(),
            producers: Vec::new(),
            duplex: Vec::new(),
            stores_in: Vec::new(),
            stores_out: Vec::new(),
            pre_hook: None,
            post_hook: None,
            cycle: 0,
            state: RunState::Idle,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Cycles completed so far, across `run` and `run_cycle` calls.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn add_consumer(&mut self, source: impl Source<M> + 'static) {
        self.consumers.push(Box::new(source));
    }

    pub fn add_producer(&mut self, sink: impl Sink<M> + 'static) {
        self.producers.push(Box::new(sink));
    }

    pub fn add_duplex(&mut self, node: impl Duplex<M> + 'static) {
        self.duplex.push(Box::new(node));
    }

    pub fn add_store_in(&mut self, store: impl Store<M> + 'static) {
        self.stores_in.push(Box::new(store));
    }

    pub fn add_store_out(&mut self, store: impl Store<M> + 'static) {
        self.stores_out.push(Box::new(store));
    }

    /// Invoked with the cycle number before each ingest phase.
    pub fn set_pre_hook(&mut self, hook: impl FnMut(u64) + Send + 'static) {
        self.pre_hook = Some(Box::new(hook));
    }

    /// Invoked with the cycle number and the surviving messages after each
    /// dispatch phase (and after every push-driven receive).
    pub fn set_post_hook(&mut self, hook: impl FnMut(u64, &[M]) + Send + 'static) {
        self.post_hook = Some(Box::new(hook));
    }

    /// Push-driven entry point: externally supplied messages skip
    /// ingestion and go straight to filter -> dispatch -> post-hook.
    pub async fn receive_messages(&mut self, messages: Vec<M>, filter_messages: bool) {
        let messages = if filter_messages {
            self.cycle_filter(messages)
        } else {
            messages
        };
        self.cycle_out(&messages).await;
        if let Some(hook) = self.post_hook.as_mut() {
            hook(self.cycle, &messages);
        }
    }

    /// Single-message convenience over `receive_messages`.
    pub async fn receive_message(&mut self, message: M, filter_messages: bool) {
        self.receive_messages(vec![message], filter_messages).await;
    }

    /// One full pass: pre-hook -> aggregate -> filter -> dispatch ->
    /// post-hook. Returns the surviving messages.
    pub async fn run_cycle(&mut self) -> Vec<M> {
        self.step(true).await
    }

    /// Drive cycles until `max_cycles` is reached, sleeping the configured
    /// period between cycles (but not after the last one).
    ///
    /// `max_cycles == 0` runs until the host cancels the future.
    /// `run_cycle_out = false` skips the dispatch phase, useful for dry
    /// runs or pure consumption; the post-hook still sees the filtered
    /// messages.
    pub async fn run(&mut self, max_cycles: u64, run_cycle_out: bool) {
        self.state = RunState::Running;
        let mut completed = 0u64;
        loop {
            self.step(run_cycle_out).await;
            completed += 1;
            if max_cycles > 0 && completed >= max_cycles {
                self.state = RunState::Stopped;
                break;
            }
            tokio::time::sleep(self.config.sleep_period).await;
        }
    }

    async fn step(&mut self, run_cycle_out: bool) -> Vec<M> {
        self.cycle += 1;
        let cycle = self.cycle;
        if self.config.verbose {
            info!(cycle, relay = %self.config.name, "cycle start");
        } else {
            debug!(cycle, "cycle start");
        }

        if let Some(hook) = self.pre_hook.as_mut() {
            hook(cycle);
        }

        let messages = self.cycle_in().await;
        let messages = self.cycle_filter(messages);

        if run_cycle_out {
            self.cycle_out(&messages).await;
        }

        if let Some(hook) = self.post_hook.as_mut() {
            hook(cycle, &messages);
        }
        messages
    }

    /// Ingest phase: read every input store in full, then fetch from
    /// consumers and duplex nodes (in that priority order) until the
    /// per-cycle cap is met, then deduplicate if configured.
    async fn cycle_in(&mut self) -> Vec<M> {
        let mut buffer: Vec<M> = Vec::new();

        for (idx, store) in self.stores_in.iter_mut().enumerate() {
            match store.read().await {
                Ok(messages) => {
                    debug!(store = idx, read = messages.len(), "input store read");
                    buffer.extend(messages);
                }
                Err(e) => {
                    warn!(store = idx, error = %e, "input store read failed; contributing nothing");
                }
            }
        }

        let count = self.config.count;
        let timeout = self.config.timeout;

        debug!(consumers = self.consumers.len(), "fetching from consumers");
        for consumer in &mut self.consumers {
            let remaining = count.saturating_sub(buffer.len());
            if remaining == 0 {
                break;
            }
            match consumer.get_messages(remaining, timeout).await {
                Ok(messages) => {
                    debug!(source = consumer.name(), fetched = messages.len(), requested = remaining, "fetched");
                    buffer.extend(messages);
                }
                Err(e) => {
                    warn!(source = consumer.name(), error = %e, "fetch failed; contributing nothing");
                }
            }
        }

        debug!(duplex = self.duplex.len(), "fetching from duplex nodes");
        for node in &mut self.duplex {
            let remaining = count.saturating_sub(buffer.len());
            if remaining == 0 {
                break;
            }
            match node.get_messages(remaining, timeout).await {
                Ok(messages) => {
                    debug!(source = node.name(), fetched = messages.len(), requested = remaining, "fetched");
                    buffer.extend(messages);
                }
                Err(e) => {
                    warn!(source = node.name(), error = %e, "fetch failed; contributing nothing");
                }
            }
        }

        if self.config.verbose {
            info!(total = buffer.len(), "aggregated cycle buffer");
        } else {
            debug!(total = buffer.len(), "aggregated cycle buffer");
        }

        if self.config.deduplicate {
            let total = buffer.len();
            let unique = dedup::dedupe(buffer);
            if self.config.verbose {
                info!(unique = unique.len(), total, "deduplicated cycle buffer");
            } else {
                debug!(unique = unique.len(), total, "deduplicated cycle buffer");
            }
            unique
        } else {
            buffer
        }
    }

    /// Filter phase, shared verbatim by the poll and push paths.
    fn cycle_filter(&self, messages: Vec<M>) -> Vec<M> {
        let messages = match &self.config.filter_metadata {
            Some(rules) => filter::by_metadata(rules, messages),
            None => messages,
        };
        if self.config.filter_last_one {
            filter::last_only(messages)
        } else {
            messages
        }
    }

    /// Fan-out phase: producers, then duplex nodes, then flush-writes to
    /// output stores. An empty batch makes no collaborator calls at all.
    /// Each destination is isolated: one failure never blocks the rest.
    async fn cycle_out(&mut self, messages: &[M]) {
        if messages.is_empty() {
            debug!("empty batch; skipping dispatch");
            return;
        }

        for producer in &mut self.producers {
            if let Err(e) = producer.send_messages(messages).await {
                warn!(sink = producer.name(), error = %e, "delivery failed; continuing");
            }
        }
        for node in &mut self.duplex {
            if let Err(e) = node.send_messages(messages).await {
                warn!(sink = node.name(), error = %e, "delivery failed; continuing");
            }
        }
        for (idx, store) in self.stores_out.iter_mut().enumerate() {
            if let Err(e) = store.write_messages(messages, true).await {
                warn!(store = idx, error = %e, "write failed; continuing");
            }
        }
    }

    /// Delete the topics attached to consumers, producers, and duplex
    /// nodes. Useful for cleaning up after testing.
    pub async fn delete_topics(&mut self) {
        for consumer in &mut self.consumers {
            if let Err(e) = consumer.delete_topic().await {
                warn!(endpoint = consumer.name(), error = %e, "delete_topic failed");
            }
        }
        for producer in &mut self.producers {
            if let Err(e) = producer.delete_topic().await {
                warn!(endpoint = producer.name(), error = %e, "delete_topic failed");
            }
        }
        for node in &mut self.duplex {
            if let Err(e) = node.delete_topic().await {
                warn!(endpoint = node.name(), error = %e, "delete_topic failed");
            }
        }
    }

    /// Release every endpoint: consumers, producers, duplex nodes, and
    /// both store lists. Failures are logged and do not stop the
    /// remaining endpoints from closing. Empty lists are fine.
    pub async fn close(&mut self) {
        for consumer in &mut self.consumers {
            if let Err(e) = consumer.close().await {
                warn!(endpoint = consumer.name(), error = %e, "close failed");
            }
        }
        for producer in &mut self.producers {
            if let Err(e) = producer.close().await {
                warn!(endpoint = producer.name(), error = %e, "close failed");
            }
        }
        for node in &mut self.duplex {
            if let Err(e) = node.close().await {
                warn!(endpoint = node.name(), error = %e, "close failed");
            }
        }
        for (idx, store) in self.stores_in.iter_mut().enumerate() {
            if let Err(e) = store.close().await {
                warn!(store = idx, error = %e, "close failed");
            }
        }
        for (idx, store) in self.stores_out.iter_mut().enumerate() {
            if let Err(e) = store.close().await {
                warn!(store = idx, error = %e, "close failed");
            }
        }
    }
}
