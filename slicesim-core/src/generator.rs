//! Traffic generators
//!
//! One generator per endpoint, driven by the endpoint's traffic profile.
//! The generator holds the flow identity and send counters; the simulation
//! engine owns the event schedule and asks the generator what and when to
//! send next.

use std::net::Ipv4Addr;
use std::time::Duration;

use slicesim_common::{EndpointId, FiveTuple, TrafficProfile, PROTO_UDP};

/// First source port handed out to generators on the remote host.
const EPHEMERAL_PORT_BASE: u16 = 49152;

/// Profile-driven packet source targeting one endpoint.
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    endpoint: EndpointId,
    tuple: FiveTuple,
    profile: TrafficProfile,
    sent: u32,
}

impl TrafficGenerator {
    /// Creates the generator for one endpoint.
    ///
    /// `index` is the endpoint's position in registration order; it picks
    /// the generator's ephemeral source port on the remote host.
    pub fn new(
        endpoint: EndpointId,
        index: usize,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        destination_port: u16,
        profile: TrafficProfile,
    ) -> Self {
        let tuple = FiveTuple {
            source,
            destination,
            source_port: EPHEMERAL_PORT_BASE.wrapping_add(index as u16),
            destination_port,
            protocol: PROTO_UDP,
        };
        Self {
            endpoint,
            tuple,
            profile,
            sent: 0,
        }
    }

    /// Endpoint this generator targets.
    pub fn endpoint(&self) -> EndpointId {
        self.endpoint
    }

    /// The flow 5-tuple of every packet this generator sends.
    pub fn tuple(&self) -> &FiveTuple {
        &self.tuple
    }

    /// Payload size of each packet in bytes.
    pub fn packet_size(&self) -> u32 {
        self.profile.packet_size
    }

    /// Interval between consecutive packets.
    pub fn send_interval(&self) -> Duration {
        self.profile.send_interval
    }

    /// Packets sent so far.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Returns true once the profile's packet budget is spent.
    pub fn exhausted(&self) -> bool {
        self.sent >= self.profile.max_packets
    }

    /// Counts one transmitted packet.
    pub fn record_send(&mut self) {
        self.sent += 1;
    }
}
