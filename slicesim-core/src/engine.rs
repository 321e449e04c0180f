//! Phase-separated simulation engine
//!
//! The engine drives three strictly ordered phases with no global mutable
//! state:
//!
//! 1. `configure` populates the endpoint registry and the slice policy
//!    table, assigns addresses and activates one dedicated bearer per
//!    endpoint. Any configuration error aborts here, before simulated time
//!    advances.
//! 2. [`Configured::run`] executes the event-driven simulated clock:
//!    generators transmit per their profiles, the cell transport serves
//!    packets under the bound QoS classes, the flow monitor accumulates
//!    counters.
//! 3. [`Completed`] holds the immutable outcome; attribution and rendering
//!    read from it.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};

use slicesim_common::{ConfigValidationError, FiveTuple, ScenarioConfig};

use crate::bearer::{Bearer, BearerEngine, BearerError};
use crate::flowmon::{FlowMonitor, FlowSample};
use crate::generator::TrafficGenerator;
use crate::policy::{PolicyError, SlicePolicyTable};
use crate::registry::{EndpointRegistry, RegistryError};
use crate::report::{attribute, render_config_summary, render_report, AttributedResult};
use crate::transport::{CellTransport, Verdict};

/// Remote host all generators transmit from (EPC-side).
const REMOTE_HOST: Ipv4Addr = Ipv4Addr::new(1, 0, 0, 2);

/// Base of the UE address pool handed out by the address allocator.
const UE_POOL_BASE: u32 = 0x0700_0000; // 7.0.0.0/8

/// Errors aborting the configure phase.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario failed semantic validation
    #[error(transparent)]
    Validation(#[from] ConfigValidationError),

    /// Endpoint registration failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Policy declaration failed
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Bearer activation failed
    #[error(transparent)]
    Bearer(#[from] BearerError),
}

#[derive(Debug)]
enum EventKind {
    /// A generator is due to transmit its next packet
    Send { generator: usize },
    /// A packet in flight reaches its destination
    Deliver {
        tuple: FiveTuple,
        bytes: u32,
        sent_at: Duration,
    },
}

#[derive(Debug)]
struct Event {
    at: Duration,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Ties resolved by insertion sequence so runs are deterministic.
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// Immutable outcome of the configure phase.
#[derive(Debug)]
pub struct Configured {
    config: ScenarioConfig,
    registry: EndpointRegistry,
    policies: SlicePolicyTable,
    bearers: Vec<Bearer>,
    transport: CellTransport,
    generators: Vec<TrafficGenerator>,
}

/// Runs the configure phase over a scenario.
///
/// Populates the registry and policy table, assigns endpoint addresses and
/// activates one dedicated bearer per endpoint. Every configuration error
/// (duplicate port or name, duplicate or missing policy, double
/// activation) surfaces here and refuses the run phase.
pub fn configure(config: ScenarioConfig) -> Result<Configured, ScenarioError> {
    config.validate()?;

    let mut registry = EndpointRegistry::new();
    for endpoint in &config.endpoints {
        let id = registry.register(
            &endpoint.name,
            endpoint.slice,
            endpoint.port,
            endpoint.profile.to_profile(),
        )?;
        // Stand-in for the external address-allocation service.
        let address = Ipv4Addr::from(UE_POOL_BASE + id.value() + 1);
        registry.assign_address(id, address)?;
    }

    let mut policies = SlicePolicyTable::new();
    for policy in &config.policies {
        policies.define(policy.slice, policy.qos)?;
    }

    let mut transport = CellTransport::new(config.cell, config.seed);
    let mut bearer_engine = BearerEngine::new();
    let mut generators = Vec::with_capacity(registry.len());
    for (index, endpoint) in registry.endpoints().enumerate() {
        bearer_engine.activate(endpoint, &policies, &mut transport)?;
        generators.push(TrafficGenerator::new(
            endpoint.id,
            index,
            REMOTE_HOST,
            endpoint.address,
            endpoint.port,
            endpoint.profile,
        ));
    }

    info!(
        endpoints = registry.len(),
        policies = policies.len(),
        "configuration complete, all bearers active"
    );

    Ok(Configured {
        config,
        registry,
        policies,
        bearers: bearer_engine.bearers().to_vec(),
        transport,
        generators,
    })
}

impl Configured {
    /// The populated endpoint registry.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// The populated policy table.
    pub fn policies(&self) -> &SlicePolicyTable {
        &self.policies
    }

    /// All activated bearers, in endpoint registration order.
    pub fn bearers(&self) -> &[Bearer] {
        &self.bearers
    }

    /// Runs the event-driven simulated time window to completion.
    pub fn run(mut self) -> Completed {
        let stop = self.config.time.duration();
        let server_start = self.config.time.server_start();
        let client_start = self.config.time.client_start();

        let mut monitor = FlowMonitor::new();
        let mut queue: BinaryHeap<Reverse<Event>> = BinaryHeap::new();
        let mut seq: u64 = 0;

        for generator in 0..self.generators.len() {
            queue.push(Reverse(Event {
                at: client_start,
                seq,
                kind: EventKind::Send { generator },
            }));
            seq += 1;
        }

        info!(
            duration_ms = stop.as_millis() as u64,
            generators = self.generators.len(),
            "run phase started"
        );

        let mut delivered: u64 = 0;
        let mut dropped: u64 = 0;

        while let Some(Reverse(event)) = queue.pop() {
            if event.at > stop {
                break;
            }
            match event.kind {
                EventKind::Send { generator } => {
                    let source = &mut self.generators[generator];
                    if source.exhausted() {
                        continue;
                    }
                    let tuple = *source.tuple();
                    let bytes = source.packet_size();
                    source.record_send();
                    let interval = source.send_interval();

                    monitor.record_tx(&tuple);
                    match self.transport.offer(tuple.destination_port, bytes) {
                        Verdict::Delivered { delay } => {
                            queue.push(Reverse(Event {
                                at: event.at + delay,
                                seq,
                                kind: EventKind::Deliver {
                                    tuple,
                                    bytes,
                                    sent_at: event.at,
                                },
                            }));
                            seq += 1;
                        }
                        Verdict::Dropped { reason } => {
                            dropped += 1;
                            trace!(%tuple, ?reason, "packet dropped in cell");
                        }
                    }

                    let next = event.at + interval;
                    if !self.generators[generator].exhausted() && next < stop {
                        queue.push(Reverse(Event {
                            at: next,
                            seq,
                            kind: EventKind::Send { generator },
                        }));
                        seq += 1;
                    }
                }
                EventKind::Deliver {
                    tuple,
                    bytes,
                    sent_at,
                } => {
                    self.transport.on_delivered(bytes);
                    if event.at >= server_start {
                        monitor.record_rx(&tuple, bytes, event.at - sent_at);
                        delivered += 1;
                    } else {
                        trace!(%tuple, "delivery before server start, discarded");
                    }
                }
            }
        }

        debug!(delivered, dropped, flows = monitor.flow_count(), "run phase complete");

        Completed {
            config: self.config,
            registry: self.registry,
            samples: monitor.snapshot(),
            active_window: stop.saturating_sub(client_start),
        }
    }
}

/// Immutable outcome of the run phase.
#[derive(Debug)]
pub struct Completed {
    config: ScenarioConfig,
    registry: EndpointRegistry,
    samples: Vec<FlowSample>,
    active_window: Duration,
}

impl Completed {
    /// The endpoint registry the run was configured with.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// The flow monitor snapshot collected during the run.
    pub fn samples(&self) -> &[FlowSample] {
        &self.samples
    }

    /// The window clients were actively transmitting in.
    pub fn active_window(&self) -> Duration {
        self.active_window
    }

    /// Attributes the collected flows back to the registered endpoints.
    pub fn attribute(&self) -> Vec<AttributedResult> {
        attribute(&self.samples, &self.registry, self.active_window)
    }

    /// Renders the results table.
    pub fn render_report(&self) -> String {
        render_report(&self.attribute())
    }

    /// Renders the scenario summary.
    pub fn render_config_summary(&self) -> String {
        render_config_summary(&self.config)
    }
}
