//! Dedicated bearer activation
//!
//! For each endpoint, builds the packet filter matching that endpoint's
//! traffic, looks up the slice's QoS policy and binds the pair on the
//! underlying transport. One bearer per endpoint, activated exactly once,
//! before any simulated time advances.

use std::collections::HashSet;

use thiserror::Error;
use tracing::info;

use slicesim_common::{EndpointId, QosClass};

use crate::policy::{PolicyError, SlicePolicyTable};
use crate::registry::Endpoint;

/// Errors raised during bearer activation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BearerError {
    /// The endpoint already has an active bearer. A second filter on the
    /// same port would make flow attribution ambiguous.
    #[error("Already activated: endpoint {0} already has a dedicated bearer")]
    AlreadyActivated(EndpointId),

    /// The endpoint's slice has no declared policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Selector matching the traffic belonging to one endpoint.
///
/// The range is degenerate here (start == end == the endpoint's port);
/// port uniqueness in the registry keeps filters disjoint across bearers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFilter {
    /// First port of the matched range
    pub port_range_start: u16,
    /// Last port of the matched range (inclusive)
    pub port_range_end: u16,
}

impl PacketFilter {
    /// Builds the degenerate filter selecting exactly one port.
    pub fn for_port(port: u16) -> Self {
        Self {
            port_range_start: port,
            port_range_end: port,
        }
    }

    /// Returns true if the filter selects the given destination port.
    pub fn matches(&self, port: u16) -> bool {
        (self.port_range_start..=self.port_range_end).contains(&port)
    }

    /// Returns true if two filters select any common port.
    pub fn overlaps(&self, other: &PacketFilter) -> bool {
        self.port_range_start <= other.port_range_end
            && other.port_range_start <= self.port_range_end
    }
}

/// The active binding of one endpoint's filter to a QoS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bearer {
    /// Endpoint the bearer serves
    pub endpoint: EndpointId,
    /// QoS class the bearer is bound to
    pub qos: QosClass,
    /// Filter selecting the endpoint's traffic
    pub filter: PacketFilter,
}

/// Transport-side interface for dedicated bearer setup.
///
/// Implemented by the simulated cell transport; from the binding onwards
/// the transport serves matching packets under the requested QoS class.
/// There is no retroactive effect on packets already offered.
pub trait QosTransport {
    /// Binds `filter` to `qos` treatment for the given endpoint's device.
    fn activate_dedicated_bearer(
        &mut self,
        endpoint: EndpointId,
        qos: QosClass,
        filter: PacketFilter,
    );
}

/// Activates dedicated bearers, one per endpoint.
#[derive(Debug, Default)]
pub struct BearerEngine {
    activated: HashSet<EndpointId>,
    bearers: Vec<Bearer>,
}

impl BearerEngine {
    /// Creates an engine with no active bearers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the dedicated bearer for one endpoint.
    ///
    /// Builds the degenerate filter for the endpoint's port, looks up the
    /// slice policy (propagating [`PolicyError::UndefinedPolicy`]) and
    /// binds the pair on the transport. A second activation for the same
    /// endpoint fails with [`BearerError::AlreadyActivated`].
    pub fn activate<T: QosTransport>(
        &mut self,
        endpoint: &Endpoint,
        policies: &SlicePolicyTable,
        transport: &mut T,
    ) -> Result<Bearer, BearerError> {
        if self.activated.contains(&endpoint.id) {
            return Err(BearerError::AlreadyActivated(endpoint.id));
        }

        let policy = policies.lookup(endpoint.slice)?;
        let filter = PacketFilter::for_port(endpoint.port);
        let bearer = Bearer {
            endpoint: endpoint.id,
            qos: policy.qos,
            filter,
        };

        transport.activate_dedicated_bearer(endpoint.id, policy.qos, filter);
        self.activated.insert(endpoint.id);
        self.bearers.push(bearer);

        info!(
            device = %endpoint.device_name,
            slice = %endpoint.slice,
            qos = %policy.qos,
            port = endpoint.port,
            "activated dedicated bearer"
        );
        Ok(bearer)
    }

    /// All bearers activated so far, in activation order.
    pub fn bearers(&self) -> &[Bearer] {
        &self.bearers
    }
}
