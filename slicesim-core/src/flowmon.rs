//! Passive flow monitor
//!
//! Records per-flow counters (tx/rx packets, rx bytes, delay sum) keyed by
//! an opaque flow id, with a 5-tuple classifier resolving ids back to flow
//! identity. Counters accumulate as a side effect of the run phase; the
//! attribution phase consumes an immutable snapshot.

use std::collections::HashMap;
use std::time::Duration;

use slicesim_common::{FiveTuple, FlowId};

/// Counters for one monitored flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Packets transmitted at the source
    pub tx_packets: u64,
    /// Packets received at the destination
    pub rx_packets: u64,
    /// Bytes received at the destination
    pub rx_bytes: u64,
    /// Sum of one-way delays over received packets
    pub delay_sum: Duration,
}

/// One flow of an attribution snapshot: identity plus counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSample {
    /// Opaque flow id
    pub flow: FlowId,
    /// Resolved flow identity
    pub tuple: FiveTuple,
    /// Accumulated counters
    pub stats: FlowStats,
}

/// Accumulates per-flow counters during the run phase.
#[derive(Debug, Default)]
pub struct FlowMonitor {
    classifier: HashMap<FiveTuple, FlowId>,
    tuples: Vec<FiveTuple>,
    stats: Vec<FlowStats>,
}

impl FlowMonitor {
    /// Creates an empty monitor.
    pub fn new() -> Self {
        Self::default()
    }

    fn flow_for(&mut self, tuple: &FiveTuple) -> FlowId {
        if let Some(id) = self.classifier.get(tuple) {
            return *id;
        }
        let id = FlowId::new(self.tuples.len() as u32);
        self.classifier.insert(*tuple, id);
        self.tuples.push(*tuple);
        self.stats.push(FlowStats::default());
        id
    }

    /// Counts one packet transmitted on the flow identified by `tuple`.
    pub fn record_tx(&mut self, tuple: &FiveTuple) {
        let id = self.flow_for(tuple);
        self.stats[id.value() as usize].tx_packets += 1;
    }

    /// Counts one packet received on the flow identified by `tuple`.
    pub fn record_rx(&mut self, tuple: &FiveTuple, bytes: u32, delay: Duration) {
        let id = self.flow_for(tuple);
        let stats = &mut self.stats[id.value() as usize];
        stats.rx_packets += 1;
        stats.rx_bytes += u64::from(bytes);
        stats.delay_sum += delay;
    }

    /// Resolves a flow id back to its 5-tuple.
    pub fn find_flow(&self, flow: FlowId) -> Option<&FiveTuple> {
        self.tuples.get(flow.value() as usize)
    }

    /// Number of distinct flows observed.
    pub fn flow_count(&self) -> usize {
        self.tuples.len()
    }

    /// Immutable snapshot of all flows for the attribution phase.
    pub fn snapshot(&self) -> Vec<FlowSample> {
        self.tuples
            .iter()
            .zip(self.stats.iter())
            .enumerate()
            .map(|(i, (tuple, stats))| FlowSample {
                flow: FlowId::new(i as u32),
                tuple: *tuple,
                stats: *stats,
            })
            .collect()
    }
}
