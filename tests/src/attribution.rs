//! Attribution tests against hand-built registries and flow snapshots

use std::net::Ipv4Addr;
use std::time::Duration;

use slicesim_common::{FiveTuple, FlowId, QosClass, SliceCategory, TrafficProfile, PROTO_UDP};
use slicesim_core::{attribute, EndpointRegistry, FlowSample, FlowStats, SlicePolicyTable};

use crate::fixtures::init_test_logging;

fn sample(flow: u32, destination_port: u16, stats: FlowStats) -> FlowSample {
    FlowSample {
        flow: FlowId::new(flow),
        tuple: FiveTuple {
            source: Ipv4Addr::new(1, 0, 0, 2),
            destination: Ipv4Addr::new(7, 0, 0, 1),
            source_port: 49152,
            destination_port,
            protocol: PROTO_UDP,
        },
        stats,
    }
}

fn spec_registry() -> EndpointRegistry {
    let profile = TrafficProfile::new(100, Duration::from_millis(1), 1000);
    let mut registry = EndpointRegistry::new();
    registry
        .register("A", SliceCategory::Urllc, 1234, profile)
        .unwrap();
    registry
        .register("B", SliceCategory::Embb, 1236, profile)
        .unwrap();
    registry
}

/// The full worked attribution example: one attributable flow, one
/// background flow, an 0.8 s active window.
#[test]
fn test_attribution_worked_example() {
    init_test_logging();

    let registry = spec_registry();
    let mut policies = SlicePolicyTable::new();
    policies
        .define(SliceCategory::Urllc, QosClass::GbrConvVoice)
        .unwrap();
    policies
        .define(SliceCategory::Embb, QosClass::NgbrVideoTcpDefault)
        .unwrap();

    let samples = [
        sample(
            0,
            1234,
            FlowStats {
                tx_packets: 1000,
                rx_packets: 950,
                rx_bytes: 95_000,
                delay_sum: Duration::from_secs(2),
            },
        ),
        sample(
            1,
            9999,
            FlowStats {
                tx_packets: 10,
                rx_packets: 10,
                rx_bytes: 1000,
                delay_sum: Duration::from_millis(10),
            },
        ),
    ];

    let results = attribute(&samples, &registry, Duration::from_millis(800));

    // Exactly one row: device A. The port-9999 flow is background traffic
    // and must be silently excluded, and B saw no traffic at all.
    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.device_name, "A");
    assert_eq!(r.slice, SliceCategory::Urllc);
    assert!((r.throughput_mbps - 0.95).abs() < 1e-9);
    assert!((r.avg_delay_ms - 2.105263157894737).abs() < 1e-6);
    assert!((r.packet_loss_pct - 5.0).abs() < 1e-9);
}

#[test]
fn test_attribution_output_order_ignores_sample_order() {
    init_test_logging();

    let registry = spec_registry();
    let stats = FlowStats {
        tx_packets: 100,
        rx_packets: 100,
        rx_bytes: 10_000,
        delay_sum: Duration::from_millis(100),
    };

    let forward = [sample(0, 1234, stats), sample(1, 1236, stats)];
    let reversed = [sample(0, 1236, stats), sample(1, 1234, stats)];

    let from_forward = attribute(&forward, &registry, Duration::from_millis(800));
    let from_reversed = attribute(&reversed, &registry, Duration::from_millis(800));

    assert_eq!(from_forward, from_reversed);
    let names: Vec<_> = from_forward.iter().map(|r| r.device_name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn test_attribution_idempotent_over_snapshot() {
    init_test_logging();

    let registry = spec_registry();
    let samples = [sample(
        0,
        1234,
        FlowStats {
            tx_packets: 42,
            rx_packets: 40,
            rx_bytes: 4000,
            delay_sum: Duration::from_millis(80),
        },
    )];

    let first = attribute(&samples, &registry, Duration::from_millis(800));
    let second = attribute(&samples, &registry, Duration::from_millis(800));
    assert_eq!(first, second);
}

#[test]
fn test_attribution_degenerate_statistics() {
    init_test_logging();

    let registry = spec_registry();

    // Transmitted but nothing received, and a completely idle flow.
    let samples = [
        sample(
            0,
            1234,
            FlowStats {
                tx_packets: 7,
                rx_packets: 0,
                rx_bytes: 0,
                delay_sum: Duration::ZERO,
            },
        ),
        sample(1, 1236, FlowStats::default()),
    ];

    let results = attribute(&samples, &registry, Duration::from_millis(800));
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].avg_delay_ms, 0.0);
    assert_eq!(results[0].packet_loss_pct, 100.0);
    assert_eq!(results[1].packet_loss_pct, 0.0);
    assert_eq!(results[1].avg_delay_ms, 0.0);
    assert_eq!(results[1].throughput_mbps, 0.0);
}
