//! End-to-end scenario tests
//!
//! Full configure/run/report cycles over the reference six-device
//! scenario: two URLLC, two eMBB and two mMTC devices sharing one cell,
//! each on its own dedicated bearer.

use slicesim_common::{QosClass, SliceCategory};
use slicesim_core::engine;

use crate::fixtures::{init_test_logging, reference_scenario};

#[test]
fn test_e2e_configure_activates_all_bearers() {
    init_test_logging();

    let configured = engine::configure(reference_scenario()).unwrap();

    assert_eq!(configured.registry().len(), 6);
    assert_eq!(configured.bearers().len(), 6);

    // One bearer per endpoint, in registration order, with pairwise
    // disjoint filters and the slice's QoS class.
    let bearers = configured.bearers();
    for (endpoint, bearer) in configured.registry().endpoints().zip(bearers) {
        assert_eq!(bearer.endpoint, endpoint.id);
        assert!(bearer.filter.matches(endpoint.port));
        let expected = match endpoint.slice {
            SliceCategory::Urllc => QosClass::GbrConvVoice,
            SliceCategory::Embb => QosClass::NgbrVideoTcpDefault,
            SliceCategory::Mmtc => QosClass::NgbrMcDelaySignal,
        };
        assert_eq!(bearer.qos, expected);
    }
    for (i, a) in bearers.iter().enumerate() {
        for b in &bearers[i + 1..] {
            assert!(!a.filter.overlaps(&b.filter));
        }
    }
}

#[test]
fn test_e2e_report_rows_in_registration_order() {
    init_test_logging();

    let completed = engine::configure(reference_scenario()).unwrap().run();
    let results = completed.attribute();

    let names: Vec<_> = results.iter().map(|r| r.device_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "IndustrialRobot",
            "AutonomousDrone",
            "8KVideo",
            "VRHeadset",
            "SmartMeter",
            "WeatherSensor"
        ]
    );
}

#[test]
fn test_e2e_slice_treatment_is_differentiated() {
    init_test_logging();
    tracing::info!("E2E Test: differentiated slice treatment");

    let completed = engine::configure(reference_scenario()).unwrap().run();
    let results = completed.attribute();
    for r in &results {
        tracing::info!(
            device = %r.device_name,
            slice = %r.slice,
            throughput_mbps = r.throughput_mbps,
            avg_delay_ms = r.avg_delay_ms,
            loss_pct = r.packet_loss_pct,
            "attributed result"
        );
    }
    let by_name = |name: &str| results.iter().find(|r| r.device_name == name).unwrap();

    let robot = by_name("IndustrialRobot");
    let video = by_name("8KVideo");
    let meter = by_name("SmartMeter");

    // eMBB moves the bulk of the bytes.
    assert!(video.throughput_mbps > 10.0);
    assert!(video.throughput_mbps > robot.throughput_mbps);
    assert!(robot.throughput_mbps > meter.throughput_mbps);

    // Higher-priority URLLC traffic sees less queueing than eMBB.
    assert!(robot.avg_delay_ms > 0.0);
    assert!(robot.avg_delay_ms < video.avg_delay_ms);

    // Nothing melts down on a cell dimensioned for the offered load.
    for r in &results {
        assert!(r.packet_loss_pct < 20.0, "{} lost {}%", r.device_name, r.packet_loss_pct);
    }
}

#[test]
fn test_e2e_mmtc_sends_single_packet_in_window() {
    init_test_logging();

    let completed = engine::configure(reference_scenario()).unwrap().run();

    // 1 s and 2 s intervals fit exactly one send into the 0.8 s window.
    for port in [1238u16, 1239] {
        let sample = completed
            .samples()
            .iter()
            .find(|s| s.tuple.destination_port == port)
            .unwrap();
        assert_eq!(sample.stats.tx_packets, 1);
    }
}

#[test]
fn test_e2e_same_seed_reproduces_report() {
    init_test_logging();

    let first = engine::configure(reference_scenario()).unwrap().run();
    let second = engine::configure(reference_scenario()).unwrap().run();

    assert_eq!(first.attribute(), second.attribute());
    assert_eq!(first.render_report(), second.render_report());
}

#[test]
fn test_e2e_report_rendering() {
    init_test_logging();

    let completed = engine::configure(reference_scenario()).unwrap().run();
    let report = completed.render_report();

    assert!(report.contains("=== NETWORK SLICING SIMULATION RESULTS (6 UEs) ==="));
    assert!(report.contains(
        "Device Name        | Slice Type | Throughput (Mbps) | Avg Delay (ms) | Packet Loss (%)"
    ));
    for name in [
        "IndustrialRobot",
        "AutonomousDrone",
        "8KVideo",
        "VRHeadset",
        "SmartMeter",
        "WeatherSensor",
    ] {
        assert!(report.contains(name), "report is missing {name}");
    }

    let summary = completed.render_config_summary();
    assert!(summary.contains("=== NETWORK CONFIGURATION ==="));
    assert!(summary.contains("UEs: 6 nodes"));
    assert!(summary.contains("  - URLLC: IndustrialRobot, AutonomousDrone"));
    assert!(summary.contains("  - eMBB: 8KVideo, VRHeadset"));
    assert!(summary.contains("  - mMTC: SmartMeter, WeatherSensor"));
    assert!(summary.contains("Frequency: 28 GHz"));
    assert!(summary.contains("Bandwidth: 100 MHz"));
    assert!(summary.contains("Numerology: 2"));
    assert!(summary.contains("Simulation Time: 1 seconds"));
}

#[test]
fn test_e2e_registration_order_follows_config_order() {
    init_test_logging();

    let mut scenario = reference_scenario();
    scenario.endpoints.reverse();

    let completed = engine::configure(scenario).unwrap().run();
    let names: Vec<_> = completed
        .attribute()
        .iter()
        .map(|r| r.device_name.clone())
        .collect();
    assert_eq!(
        names,
        [
            "WeatherSensor",
            "SmartMeter",
            "VRHeadset",
            "8KVideo",
            "AutonomousDrone",
            "IndustrialRobot"
        ]
    );
}
