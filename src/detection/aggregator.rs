//! Per-address aggregation of classified events
//!
//! Keeps two maps keyed by source address: the number of connects seen and
//! the distinct envelope senders from rejected RCPT attempts, in first-seen
//! order. Both only ever grow during a run.

use std::collections::HashMap;

use crate::models::ScanEvent;

/// Connection count for one source address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCount {
    pub count: u64,
    /// Connect sequence number of the most recent increment, used to order
    /// addresses that end with the same count
    pub reached_at: u64,
}

/// Folds scan events into per-address counts and sender lists
#[derive(Debug, Default)]
pub struct Aggregator {
    counts: HashMap<String, AddressCount>,
    senders: HashMap<String, Vec<String>>,
    connects_seen: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to the aggregate
    pub fn fold(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::Connect { source } => self.record_connect(source),
            ScanEvent::Reject { source, sender } => self.record_sender(source, sender),
            ScanEvent::Irrelevant => {}
        }
    }

    fn record_connect(&mut self, source: String) {
        self.connects_seen += 1;
        let seq = self.connects_seen;

        let entry = self.counts.entry(source).or_insert(AddressCount {
            count: 0,
            reached_at: seq,
        });
        entry.count += 1;
        entry.reached_at = seq;
    }

    fn record_sender(&mut self, source: String, sender: String) {
        let senders = self.senders.entry(source).or_default();
        if !senders.contains(&sender) {
            senders.push(sender);
        }
    }

    /// Number of connects recorded for an address (0 if never seen)
    pub fn count(&self, source: &str) -> u64 {
        self.counts.get(source).map(|c| c.count).unwrap_or(0)
    }

    /// Senders recorded for an address, in first-seen order
    pub fn senders(&self, source: &str) -> Option<&[String]> {
        self.senders.get(source).map(Vec::as_slice)
    }

    /// Number of distinct addresses with at least one connect
    pub fn address_count(&self) -> usize {
        self.counts.len()
    }

    /// Consume the aggregator, handing out the final maps
    pub fn into_parts(self) -> (HashMap<String, AddressCount>, HashMap<String, Vec<String>>) {
        (self.counts, self.senders)
    }
}
