//! Common types and utilities for slicesim
//!
//! This crate provides the shared vocabulary of the slicesim network slicing
//! simulator: slice categories, QoS classes, traffic profiles, scenario
//! configuration and logging setup used across all slicesim crates.

pub mod config;
pub mod logging;
pub mod types;

pub use config::{
    load_scenario, CellConfig, ConfigError, ConfigValidationError, EndpointConfig, PolicyConfig,
    ProfileConfig, ScenarioConfig, SimTimeConfig,
};
pub use logging::{init_logging, init_logging_with_filter, LogLevel};
pub use types::{
    EndpointId, FiveTuple, FlowId, QosCharacteristics, QosClass, QosResourceType, SliceCategory,
    TrafficProfile, PROTO_UDP,
};
