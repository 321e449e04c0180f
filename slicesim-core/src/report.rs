//! Flow attribution and report rendering
//!
//! Joins the flow monitor's post-run snapshot against the endpoint
//! registry: each flow is resolved to its endpoint via the destination
//! port, derived metrics are computed, and results are emitted in
//! registration order so the report is stable across runs with the same
//! configuration. Flows outside the declared endpoint set (control or
//! background traffic) are silently excluded.

use std::collections::HashMap;
use std::time::Duration;

use tracing::trace;

use slicesim_common::{ScenarioConfig, SliceCategory};

use crate::flowmon::{FlowSample, FlowStats};
use crate::registry::EndpointRegistry;

/// Derived per-endpoint metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedResult {
    /// Device name from the registry
    pub device_name: String,
    /// Slice the device belongs to
    pub slice: SliceCategory,
    /// Received throughput over the active window, in Mbps
    pub throughput_mbps: f64,
    /// Mean one-way delay over received packets, in ms (0 if none received)
    pub avg_delay_ms: f64,
    /// Share of transmitted packets never received, in percent (0 if none sent)
    pub packet_loss_pct: f64,
}

fn derive(stats: &FlowStats, active_window: Duration, device_name: &str, slice: SliceCategory) -> AttributedResult {
    let throughput_mbps = stats.rx_bytes as f64 * 8.0 / active_window.as_secs_f64() / 1e6;

    let avg_delay_ms = if stats.rx_packets > 0 {
        stats.delay_sum.as_secs_f64() * 1000.0 / stats.rx_packets as f64
    } else {
        0.0
    };

    let packet_loss_pct = if stats.tx_packets > 0 {
        (stats.tx_packets - stats.rx_packets) as f64 * 100.0 / stats.tx_packets as f64
    } else {
        0.0
    };

    AttributedResult {
        device_name: device_name.to_owned(),
        slice,
        throughput_mbps,
        avg_delay_ms,
        packet_loss_pct,
    }
}

/// Attributes a flow snapshot back to the registered endpoints.
///
/// Flows whose destination port matches no registered endpoint are skipped,
/// not errors. Results are emitted in endpoint registration order,
/// independent of the order of `samples`; endpoints with no observed flow
/// produce no row. The computation is read-only, so attributing the same
/// snapshot twice yields identical output.
pub fn attribute(
    samples: &[FlowSample],
    registry: &EndpointRegistry,
    active_window: Duration,
) -> Vec<AttributedResult> {
    let mut per_port: HashMap<u16, FlowStats> = HashMap::new();

    for sample in samples {
        let port = sample.tuple.destination_port;
        if registry.resolve_by_port(port).is_err() {
            trace!(flow = %sample.flow, tuple = %sample.tuple, "skipping unattributed flow");
            continue;
        }
        let merged = per_port.entry(port).or_default();
        merged.tx_packets += sample.stats.tx_packets;
        merged.rx_packets += sample.stats.rx_packets;
        merged.rx_bytes += sample.stats.rx_bytes;
        merged.delay_sum += sample.stats.delay_sum;
    }

    registry
        .endpoints()
        .filter_map(|endpoint| {
            per_port
                .get(&endpoint.port)
                .map(|stats| derive(stats, active_window, &endpoint.device_name, endpoint.slice))
        })
        .collect()
}

/// Renders the results table.
///
/// Columns are device name, slice type, throughput (Mbps), average delay
/// (ms) and packet loss (%), one row per attributed endpoint, in the order
/// `results` was produced in (registration order).
pub fn render_report(results: &[AttributedResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n=== NETWORK SLICING SIMULATION RESULTS ({} UEs) ===\n",
        results.len()
    ));
    out.push_str(
        "Device Name        | Slice Type | Throughput (Mbps) | Avg Delay (ms) | Packet Loss (%)\n",
    );
    out.push_str(
        "----------------------------------------------------------------------------------------\n",
    );

    for result in results {
        out.push_str(&format!(
            "{:>17} | {:>10} | {:>16.2} | {:>13.3} | {:>14.2}\n",
            result.device_name,
            result.slice.to_string(),
            result.throughput_mbps,
            result.avg_delay_ms,
            result.packet_loss_pct,
        ));
    }
    out
}

/// Renders the scenario summary printed after the results table.
pub fn render_config_summary(config: &ScenarioConfig) -> String {
    let mut out = String::new();
    out.push_str("\n=== NETWORK CONFIGURATION ===\n");
    out.push_str("gNB: 1 node\n");
    out.push_str(&format!("UEs: {} nodes\n", config.endpoints.len()));

    let mut slices: Vec<SliceCategory> = config.endpoints.iter().map(|e| e.slice).collect();
    slices.sort();
    slices.dedup();
    for slice in slices {
        let names: Vec<&str> = config
            .endpoints
            .iter()
            .filter(|e| e.slice == slice)
            .map(|e| e.name.as_str())
            .collect();
        out.push_str(&format!("  - {}: {}\n", slice, names.join(", ")));
    }

    out.push_str(&format!(
        "Frequency: {} GHz\n",
        config.cell.frequency_hz / 1e9
    ));
    out.push_str(&format!(
        "Bandwidth: {} MHz\n",
        config.cell.bandwidth_hz / 1e6
    ));
    out.push_str(&format!("Numerology: {}\n", config.cell.numerology));
    out.push_str(&format!(
        "Simulation Time: {} seconds\n",
        config.time.duration().as_secs_f64()
    ));
    out
}
