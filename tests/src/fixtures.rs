//! Common fixtures for integration tests

use std::sync::Once;

use slicesim_common::{
    CellConfig, EndpointConfig, PolicyConfig, ProfileConfig, QosClass, ScenarioConfig,
    SimTimeConfig, SliceCategory,
};

static INIT: Once = Once::new();

/// Initializes test logging once per process.
///
/// Honors `RUST_LOG` when set; defaults to `info`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn endpoint(
    name: &str,
    slice: SliceCategory,
    port: u16,
    packet_size: u32,
    interval_us: u64,
    max_packets: u32,
) -> EndpointConfig {
    EndpointConfig {
        name: name.into(),
        slice,
        port,
        profile: ProfileConfig {
            packet_size,
            interval_us,
            max_packets,
        },
    }
}

/// The reference six-device scenario shipped in `config/slice.yaml`:
/// two URLLC, two eMBB and two mMTC devices on a 28 GHz / 100 MHz cell,
/// clients transmitting from 200 ms to the 1 s mark.
pub fn reference_scenario() -> ScenarioConfig {
    ScenarioConfig {
        cell: CellConfig {
            frequency_hz: 28e9,
            bandwidth_hz: 100e6,
            numerology: 2,
            tx_power_dbm: 23.0,
        },
        time: SimTimeConfig {
            duration_ms: 1000,
            server_start_ms: 100,
            client_start_ms: 200,
        },
        seed: 1,
        endpoints: vec![
            endpoint("IndustrialRobot", SliceCategory::Urllc, 1234, 100, 1000, 1_000_000),
            endpoint("AutonomousDrone", SliceCategory::Urllc, 1235, 80, 500, 1_000_000),
            endpoint("8KVideo", SliceCategory::Embb, 1236, 1400, 100, 1_000_000),
            endpoint("VRHeadset", SliceCategory::Embb, 1237, 1200, 200, 1_000_000),
            endpoint("SmartMeter", SliceCategory::Mmtc, 1238, 40, 1_000_000, 1000),
            endpoint("WeatherSensor", SliceCategory::Mmtc, 1239, 30, 2_000_000, 500),
        ],
        policies: vec![
            PolicyConfig {
                slice: SliceCategory::Urllc,
                qos: QosClass::GbrConvVoice,
            },
            PolicyConfig {
                slice: SliceCategory::Embb,
                qos: QosClass::NgbrVideoTcpDefault,
            },
            PolicyConfig {
                slice: SliceCategory::Mmtc,
                qos: QosClass::NgbrMcDelaySignal,
            },
        ],
    }
}
