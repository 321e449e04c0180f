//! Scenario configuration for the slicing simulator
//!
//! A scenario is a typed YAML document declaring the cell, the simulated
//! time window, the traffic endpoints and the per-slice QoS policies.
//! Loading performs schema parsing; [`ScenarioConfig::validate`] performs
//! the semantic checks that must fail before any simulated time advances.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{QosClass, SliceCategory, TrafficProfile};

/// Errors that can occur during scenario loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Scenario validation error
    #[error("Scenario validation failed: {0}")]
    Validation(#[from] ConfigValidationError),
}

/// Errors that can occur during scenario validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// No endpoints declared
    #[error("No endpoints configured: at least one endpoint must be specified")]
    NoEndpoints,

    /// Invalid simulated time window
    #[error("Invalid time configuration: {0}")]
    InvalidTime(String),

    /// Invalid cell parameters
    #[error("Invalid cell configuration: {0}")]
    InvalidCell(String),

    /// Invalid endpoint declaration
    #[error("Invalid endpoint '{name}': {reason}")]
    InvalidEndpoint {
        /// Device name of the offending endpoint
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// An endpoint references a slice with no declared policy
    #[error("No QoS policy declared for slice {0}")]
    MissingPolicy(SliceCategory),
}

/// Radio cell parameters.
///
/// Consumed for the capacity estimate and the configuration summary; the
/// simulator does not model PHY-layer propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: f64,
    /// Channel bandwidth in Hz
    pub bandwidth_hz: f64,
    /// NR numerology (0-4); slot duration is 1 ms / 2^numerology
    pub numerology: u8,
    /// Transmit power in dBm
    #[serde(default = "default_tx_power_dbm")]
    pub tx_power_dbm: f64,
}

fn default_tx_power_dbm() -> f64 {
    23.0
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 28e9,
            bandwidth_hz: 100e6,
            numerology: 2,
            tx_power_dbm: default_tx_power_dbm(),
        }
    }
}

impl CellConfig {
    /// Slot duration for the configured numerology.
    pub fn slot_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000 >> self.numerology)
    }
}

/// Simulated time window.
///
/// Servers come up at `server_start_ms`, clients transmit from
/// `client_start_ms` until `duration_ms`, and the whole simulation halts at
/// `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTimeConfig {
    /// Total simulated duration in milliseconds
    pub duration_ms: u64,
    /// Server (receiver) start time in milliseconds
    #[serde(default = "default_server_start_ms")]
    pub server_start_ms: u64,
    /// Client (generator) start time in milliseconds
    #[serde(default = "default_client_start_ms")]
    pub client_start_ms: u64,
}

fn default_server_start_ms() -> u64 {
    100
}

fn default_client_start_ms() -> u64 {
    200
}

impl Default for SimTimeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            server_start_ms: default_server_start_ms(),
            client_start_ms: default_client_start_ms(),
        }
    }
}

impl SimTimeConfig {
    /// Total simulated duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Server start time.
    pub fn server_start(&self) -> Duration {
        Duration::from_millis(self.server_start_ms)
    }

    /// Client start time.
    pub fn client_start(&self) -> Duration {
        Duration::from_millis(self.client_start_ms)
    }

    /// The window during which clients actively transmit; the denominator
    /// of the throughput computation.
    pub fn active_window(&self) -> Duration {
        self.duration().saturating_sub(self.client_start())
    }
}

/// Traffic profile as declared in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// UDP payload size in bytes
    pub packet_size: u32,
    /// Interval between packets in microseconds
    pub interval_us: u64,
    /// Upper bound on generated packets
    pub max_packets: u32,
}

impl ProfileConfig {
    /// Converts to the runtime traffic profile.
    pub fn to_profile(&self) -> TrafficProfile {
        TrafficProfile::new(
            self.packet_size,
            Duration::from_micros(self.interval_us),
            self.max_packets,
        )
    }
}

/// One traffic endpoint declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Device name, unique within the scenario
    pub name: String,
    /// Slice the device belongs to
    pub slice: SliceCategory,
    /// UDP port the device listens on, unique within the scenario
    pub port: u16,
    /// Traffic generation parameters
    pub profile: ProfileConfig,
}

/// One per-slice QoS policy declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Slice the policy applies to
    pub slice: SliceCategory,
    /// QoS class bearers of this slice are bound to
    pub qos: QosClass,
}

/// Complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Radio cell parameters
    #[serde(default)]
    pub cell: CellConfig,
    /// Simulated time window
    #[serde(default)]
    pub time: SimTimeConfig,
    /// Seed for the transport's random draws; same seed, same report
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Traffic endpoints, in registration order
    pub endpoints: Vec<EndpointConfig>,
    /// Per-slice QoS policies
    pub policies: Vec<PolicyConfig>,
}

fn default_seed() -> u64 {
    1
}

impl ScenarioConfig {
    /// Performs the semantic checks that must fail before the run phase.
    ///
    /// Port and name uniqueness are not checked here; the endpoint registry
    /// enforces them at registration time, which is the authoritative
    /// safeguard for unambiguous flow attribution.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.endpoints.is_empty() {
            return Err(ConfigValidationError::NoEndpoints);
        }

        if self.cell.frequency_hz <= 0.0 {
            return Err(ConfigValidationError::InvalidCell(format!(
                "frequency must be positive, got {}",
                self.cell.frequency_hz
            )));
        }
        if self.cell.bandwidth_hz <= 0.0 {
            return Err(ConfigValidationError::InvalidCell(format!(
                "bandwidth must be positive, got {}",
                self.cell.bandwidth_hz
            )));
        }
        if self.cell.numerology > 4 {
            return Err(ConfigValidationError::InvalidCell(format!(
                "numerology must be 0-4, got {}",
                self.cell.numerology
            )));
        }

        if self.time.client_start_ms >= self.time.duration_ms {
            return Err(ConfigValidationError::InvalidTime(format!(
                "client start ({} ms) must precede the simulation end ({} ms)",
                self.time.client_start_ms, self.time.duration_ms
            )));
        }
        if self.time.server_start_ms > self.time.client_start_ms {
            return Err(ConfigValidationError::InvalidTime(format!(
                "servers must be up before clients start ({} ms > {} ms)",
                self.time.server_start_ms, self.time.client_start_ms
            )));
        }

        for endpoint in &self.endpoints {
            if endpoint.name.is_empty() {
                return Err(ConfigValidationError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: "device name must not be empty".into(),
                });
            }
            if endpoint.port == 0 {
                return Err(ConfigValidationError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: "port must be nonzero".into(),
                });
            }
            if endpoint.profile.packet_size == 0 {
                return Err(ConfigValidationError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: "packet size must be nonzero".into(),
                });
            }
            if endpoint.profile.interval_us == 0 {
                return Err(ConfigValidationError::InvalidEndpoint {
                    name: endpoint.name.clone(),
                    reason: "send interval must be nonzero".into(),
                });
            }

            if !self.policies.iter().any(|p| p.slice == endpoint.slice) {
                return Err(ConfigValidationError::MissingPolicy(endpoint.slice));
            }
        }

        Ok(())
    }
}

/// Loads a scenario configuration from a YAML file and validates it.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: ScenarioConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
