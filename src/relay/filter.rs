//! Content filters applied between aggregation and dispatch.
//!
//! Both the polling run loop and the push-driven `receive_messages` path
//! go through these functions, so the two entry points share identical
//! semantics.

use std::collections::{HashMap, HashSet};

use crate::relay::message::Relayable;

/// Metadata filter rules: key -> set of allowed values.
///
/// Rules are conjunctive. A message passes only if, for every configured
/// key, its own metadata carries one of the allowed values.
pub type MetadataRules = HashMap<String, HashSet<String>>;

/// Keep the messages whose metadata satisfies every rule.
///
/// A message without metadata, or whose metadata lacks a configured key,
/// is excluded rather than treated as an error.
pub fn by_metadata<M: Relayable>(rules: &MetadataRules, messages: Vec<M>) -> Vec<M> {
    messages
        .into_iter()
        .filter(|message| match message.metadata() {
            Some(metadata) => rules.iter().all(|(key, allowed)| {
                metadata.get(key).is_some_and(|value| allowed.contains(value))
            }),
            None => false,
        })
        .collect()
}

/// Collapse to the final message in buffer order, or nothing at all.
pub fn last_only<M>(mut messages: Vec<M>) -> Vec<M> {
    match messages.pop() {
        Some(last) => vec![last],
        None => Vec::new(),
    }
}
