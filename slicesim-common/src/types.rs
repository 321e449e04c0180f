//! Core slicing types: slice categories, QoS classes, traffic profiles, flow identity.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// IP protocol number for UDP, used in flow 5-tuples.
pub const PROTO_UDP: u8 = 17;

/// Slice/service category a device belongs to.
///
/// The set is three categories today, but everything keyed by a category
/// (policy table, report grouping) is table-driven, so adding a category
/// does not require structural changes elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SliceCategory {
    /// Ultra-Reliable Low-Latency Communication
    #[serde(rename = "URLLC")]
    Urllc,
    /// enhanced Mobile Broadband
    #[serde(rename = "eMBB")]
    Embb,
    /// massive Machine-Type Communication
    #[serde(rename = "mMTC")]
    Mmtc,
}

impl fmt::Display for SliceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceCategory::Urllc => write!(f, "URLLC"),
            SliceCategory::Embb => write!(f, "eMBB"),
            SliceCategory::Mmtc => write!(f, "mMTC"),
        }
    }
}

/// Resource type of a QoS class (TS 23.501 §5.7.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QosResourceType {
    /// Guaranteed bitrate
    Gbr,
    /// Non-guaranteed bitrate
    NonGbr,
}

/// QoS treatment class for a dedicated bearer.
///
/// Each class is identified by its standardized 5QI value (the enum
/// discriminant) and maps to a fixed set of [`QosCharacteristics`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum QosClass {
    /// 5QI 1 - GBR conversational voice
    GbrConvVoice = 1,
    /// 5QI 9 - non-GBR buffered video / TCP default
    NgbrVideoTcpDefault = 9,
    /// 5QI 69 - non-GBR mission-critical delay-sensitive signalling
    NgbrMcDelaySignal = 69,
}

/// Standardized characteristics of a QoS class (TS 23.501 Table 5.7.4-1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QosCharacteristics {
    /// GBR or non-GBR treatment
    pub resource_type: QosResourceType,
    /// Priority level (lower value is served first)
    pub priority: u8,
    /// Packet delay budget; packets exceeding it are discarded
    pub packet_delay_budget: Duration,
    /// Packet error rate the class tolerates
    pub packet_error_rate: f64,
}

impl QosClass {
    /// Returns the standardized 5QI value of this class.
    pub fn five_qi(self) -> u8 {
        u8::from(self)
    }

    /// Returns the standardized characteristics of this class.
    pub fn characteristics(self) -> QosCharacteristics {
        match self {
            QosClass::GbrConvVoice => QosCharacteristics {
                resource_type: QosResourceType::Gbr,
                priority: 20,
                packet_delay_budget: Duration::from_millis(100),
                packet_error_rate: 1e-2,
            },
            QosClass::NgbrVideoTcpDefault => QosCharacteristics {
                resource_type: QosResourceType::NonGbr,
                priority: 90,
                packet_delay_budget: Duration::from_millis(300),
                packet_error_rate: 1e-6,
            },
            QosClass::NgbrMcDelaySignal => QosCharacteristics {
                resource_type: QosResourceType::NonGbr,
                priority: 5,
                packet_delay_budget: Duration::from_millis(60),
                packet_error_rate: 1e-6,
            },
        }
    }

    /// Returns true if this class has guaranteed-bitrate semantics.
    pub fn is_gbr(self) -> bool {
        self.characteristics().resource_type == QosResourceType::Gbr
    }
}

impl fmt::Display for QosClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QosClass::GbrConvVoice => write!(f, "GBR_CONV_VOICE"),
            QosClass::NgbrVideoTcpDefault => write!(f, "NGBR_VIDEO_TCP_DEFAULT"),
            QosClass::NgbrMcDelaySignal => write!(f, "NGBR_MC_DELAY_SIGNAL"),
        }
    }
}

/// Traffic generation parameters for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficProfile {
    /// UDP payload size in bytes
    pub packet_size: u32,
    /// Interval between consecutive packets
    pub send_interval: Duration,
    /// Upper bound on the number of packets generated
    pub max_packets: u32,
}

impl TrafficProfile {
    /// Creates a new traffic profile.
    pub fn new(packet_size: u32, send_interval: Duration, max_packets: u32) -> Self {
        Self {
            packet_size,
            send_interval,
            max_packets,
        }
    }

    /// Offered bitrate of this profile in bits per second.
    pub fn offered_bitrate_bps(&self) -> f64 {
        if self.send_interval.is_zero() {
            return 0.0;
        }
        f64::from(self.packet_size) * 8.0 / self.send_interval.as_secs_f64()
    }
}

/// Opaque identifier of a registered traffic endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointId(u32);

impl EndpointId {
    /// Creates an endpoint id from its raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a monitored flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowId(u32);

impl FlowId {
    /// Creates a flow id from its raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classic 5-tuple identifying one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiveTuple {
    /// Source IPv4 address
    pub source: Ipv4Addr,
    /// Destination IPv4 address
    pub destination: Ipv4Addr,
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// IP protocol number
    pub protocol: u8,
}

impl fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} proto {}",
            self.source, self.source_port, self.destination, self.destination_port, self.protocol
        )
    }
}
