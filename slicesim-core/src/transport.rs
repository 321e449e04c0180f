//! Simulated radio cell transport
//!
//! Stands in for the radio stack: serves offered packets under the QoS
//! class their destination port is bound to, with a numerology-scaled
//! air-interface latency, a priority-weighted queueing term that grows with
//! the instantaneous cell load, random losses at the class packet error
//! rate, and discard of packets that would exceed the class delay budget.
//!
//! The model is a service abstraction, not a PHY: capacity is a flat
//! spectral-efficiency estimate over the configured bandwidth.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, trace};

use slicesim_common::{CellConfig, EndpointId, QosClass};

use crate::bearer::{PacketFilter, QosTransport};

/// Spectral efficiency assumed for the capacity estimate, in bit/s/Hz.
const SPECTRAL_EFFICIENCY: f64 = 4.0;

/// Fixed air-interface latency in slots (grant, transmission, processing).
const AIR_LATENCY_SLOTS: u32 = 4;

/// Priority value the queueing weight is normalized against.
const PRIORITY_REF: f64 = 50.0;

/// Class served to traffic matching no dedicated bearer. This is what the
/// default bearer carries; flows on it are the "background" traffic the
/// report later skips.
const DEFAULT_CLASS: QosClass = QosClass::NgbrVideoTcpDefault;

/// Why the transport discarded a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Lost at the class packet error rate
    ErrorRate,
    /// Would have exceeded the class packet delay budget
    DelayBudget,
}

/// Outcome of offering one packet to the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Packet will be delivered after `delay`
    Delivered {
        /// One-way delay from offer to delivery
        delay: Duration,
    },
    /// Packet was discarded
    Dropped {
        /// Discard cause
        reason: DropReason,
    },
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    endpoint: EndpointId,
    qos: QosClass,
    filter: PacketFilter,
}

/// The simulated cell shared by all endpoints.
#[derive(Debug)]
pub struct CellTransport {
    cell: CellConfig,
    bindings: Vec<Binding>,
    rng: StdRng,
    in_flight_bytes: u64,
    capacity_bps: f64,
}

impl CellTransport {
    /// Creates a cell transport for the given cell parameters.
    ///
    /// `seed` drives the loss and jitter draws; the same seed over the same
    /// offered sequence yields identical verdicts.
    pub fn new(cell: CellConfig, seed: u64) -> Self {
        let capacity_bps = cell.bandwidth_hz * SPECTRAL_EFFICIENCY;
        info!(
            bandwidth_mhz = cell.bandwidth_hz / 1e6,
            numerology = cell.numerology,
            capacity_mbps = capacity_bps / 1e6,
            "cell transport up"
        );
        Self {
            cell,
            bindings: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            in_flight_bytes: 0,
            capacity_bps,
        }
    }

    fn serving_binding(&self, destination_port: u16) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.filter.matches(destination_port))
    }

    /// QoS class serving packets addressed to `destination_port`.
    ///
    /// First matching dedicated bearer wins; unmatched traffic rides the
    /// default bearer class.
    pub fn classify(&self, destination_port: u16) -> QosClass {
        self.serving_binding(destination_port)
            .map(|b| b.qos)
            .unwrap_or(DEFAULT_CLASS)
    }

    /// Endpoint whose dedicated bearer serves `destination_port`, if any.
    pub fn serving_endpoint(&self, destination_port: u16) -> Option<EndpointId> {
        self.serving_binding(destination_port).map(|b| b.endpoint)
    }

    /// Offers one packet to the cell at the current simulated instant.
    ///
    /// On [`Verdict::Delivered`] the packet occupies the cell until the
    /// caller reports the delivery via [`CellTransport::on_delivered`].
    pub fn offer(&mut self, destination_port: u16, bytes: u32) -> Verdict {
        let qos = self.classify(destination_port);
        let chars = qos.characteristics();

        if self.rng.gen::<f64>() < chars.packet_error_rate {
            trace!(port = destination_port, %qos, "packet lost at class error rate");
            return Verdict::Dropped {
                reason: DropReason::ErrorRate,
            };
        }

        let slot = self.cell.slot_duration();
        let air = slot * AIR_LATENCY_SLOTS;
        let queue_secs = (self.in_flight_bytes as f64) * 8.0 / self.capacity_bps
            * (f64::from(chars.priority) / PRIORITY_REF);
        let jitter = slot.mul_f64(self.rng.gen::<f64>() * 0.5);
        let delay = air + Duration::from_secs_f64(queue_secs) + jitter;

        if delay > chars.packet_delay_budget {
            trace!(
                port = destination_port,
                %qos,
                delay_ms = delay.as_secs_f64() * 1e3,
                "packet exceeds delay budget"
            );
            return Verdict::Dropped {
                reason: DropReason::DelayBudget,
            };
        }

        self.in_flight_bytes += u64::from(bytes);
        Verdict::Delivered { delay }
    }

    /// Reports that a previously offered packet left the cell.
    pub fn on_delivered(&mut self, bytes: u32) {
        self.in_flight_bytes = self.in_flight_bytes.saturating_sub(u64::from(bytes));
    }

    /// Bytes currently in flight through the cell.
    pub fn in_flight_bytes(&self) -> u64 {
        self.in_flight_bytes
    }

    /// Capacity estimate of the cell in bits per second.
    pub fn capacity_bps(&self) -> f64 {
        self.capacity_bps
    }
}

impl QosTransport for CellTransport {
    fn activate_dedicated_bearer(
        &mut self,
        endpoint: EndpointId,
        qos: QosClass,
        filter: PacketFilter,
    ) {
        trace!(
            %endpoint,
            %qos,
            port_start = filter.port_range_start,
            port_end = filter.port_range_end,
            "binding dedicated bearer"
        );
        self.bindings.push(Binding {
            endpoint,
            qos,
            filter,
        });
    }
}
