//! Within-cycle deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Reduce `messages` to first-occurrence-unique elements, preserving the
/// original order. Idempotent. Duplicates are exact (structural) matches
/// only; nothing is compared across cycles.
pub fn dedupe<M: Eq + Hash + Clone>(messages: Vec<M>) -> Vec<M> {
    let mut seen = HashSet::with_capacity(messages.len());
    let mut out = Vec::with_capacity(messages.len());
    for message in messages {
        if seen.insert(message.clone()) {
            out.push(message);
        }
    }
    out
}
