//! Traffic endpoint registry
//!
//! Declares each traffic-generating device, its slice membership and its
//! network identity. The registry is populated during the configure phase
//! and read-only afterwards; registration order is preserved so the final
//! report is reproducible across runs.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::debug;

use slicesim_common::{EndpointId, SliceCategory, TrafficProfile};

/// Errors raised by the endpoint registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The port is already bound to another endpoint. Port uniqueness is
    /// what guarantees unambiguous flow-to-endpoint attribution, so this is
    /// fatal at configuration time.
    #[error("Duplicate port: {0} is already registered to another endpoint")]
    DuplicatePort(u16),

    /// The device name is already taken.
    #[error("Duplicate device name: '{0}' is already registered")]
    DuplicateName(String),

    /// No endpoint listens on the given port.
    #[error("Unknown port: no endpoint registered on port {0}")]
    UnknownPort(u16),

    /// No endpoint with the given id.
    #[error("Unknown endpoint id: {0}")]
    UnknownEndpoint(EndpointId),
}

/// One traffic-generating/consuming device.
///
/// Created once at configuration time; immutable for the rest of the
/// simulation. The network address is assigned by the transport's address
/// allocator after registration, before bearer activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Registry-assigned identifier
    pub id: EndpointId,
    /// Device name, unique within the registry
    pub device_name: String,
    /// Slice the device belongs to
    pub slice: SliceCategory,
    /// Assigned network address (unspecified until assigned)
    pub address: Ipv4Addr,
    /// UDP port the device listens on, unique across endpoints
    pub port: u16,
    /// Traffic generation parameters handed to the generator
    pub profile: TrafficProfile,
}

/// Registry of all traffic endpoints in the scenario.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    entries: Vec<Endpoint>,
    by_port: HashMap<u16, EndpointId>,
    by_name: HashMap<String, EndpointId>,
}

impl EndpointRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new endpoint.
    ///
    /// Fails with [`RegistryError::DuplicatePort`] or
    /// [`RegistryError::DuplicateName`] without modifying the registry.
    pub fn register(
        &mut self,
        device_name: &str,
        slice: SliceCategory,
        port: u16,
        profile: TrafficProfile,
    ) -> Result<EndpointId, RegistryError> {
        if self.by_port.contains_key(&port) {
            return Err(RegistryError::DuplicatePort(port));
        }
        if self.by_name.contains_key(device_name) {
            return Err(RegistryError::DuplicateName(device_name.to_owned()));
        }

        let id = EndpointId::new(self.entries.len() as u32);
        self.entries.push(Endpoint {
            id,
            device_name: device_name.to_owned(),
            slice,
            address: Ipv4Addr::UNSPECIFIED,
            port,
            profile,
        });
        self.by_port.insert(port, id);
        self.by_name.insert(device_name.to_owned(), id);

        debug!(device = device_name, %slice, port, "registered endpoint");
        Ok(id)
    }

    /// Records the network address assigned to an endpoint by the
    /// transport's address allocator.
    pub fn assign_address(
        &mut self,
        id: EndpointId,
        address: Ipv4Addr,
    ) -> Result<(), RegistryError> {
        let endpoint = self
            .entries
            .get_mut(id.value() as usize)
            .ok_or(RegistryError::UnknownEndpoint(id))?;
        endpoint.address = address;
        Ok(())
    }

    /// Looks up the endpoint listening on the given port.
    pub fn resolve_by_port(&self, port: u16) -> Result<&Endpoint, RegistryError> {
        let id = self
            .by_port
            .get(&port)
            .ok_or(RegistryError::UnknownPort(port))?;
        Ok(&self.entries[id.value() as usize])
    }

    /// Returns the endpoint with the given id.
    pub fn get(&self, id: EndpointId) -> Result<&Endpoint, RegistryError> {
        self.entries
            .get(id.value() as usize)
            .ok_or(RegistryError::UnknownEndpoint(id))
    }

    /// Iterates over all endpoints in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.entries.iter()
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
