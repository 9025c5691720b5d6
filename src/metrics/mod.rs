//! Centralized metrics infrastructure for the gateway.
//!
//! Each phase (broker connection handling, event submission) defines its own
//! metrics in a dedicated submodule, ensuring clear ownership and preventing
//! naming conflicts.

pub mod broker;
pub mod registry;
pub mod sender;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the Prometheus recorder and registers all phase metrics.
///
/// Idempotent. No exporter HTTP listener is started; the snapshot is served
/// from the in-process handle through the gateway's own `/metrics` route.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            registry::register_all_metrics();
            info!("Prometheus recorder installed (served via /metrics)");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Renders the current snapshot in the Prometheus text exposition format.
pub fn render() -> String {
    HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}

/// Trait for phase-specific metrics collections.
///
/// Each phase implements this to provide registration at startup, a
/// consistent name prefix, and documentation of what each metric measures.
pub trait PhaseMetrics {
    /// Register all metrics for this phase.
    fn register_metrics();

    /// Phase name used as the metric name prefix.
    fn phase_name() -> &'static str;

    /// Documentation for all metrics in this phase.
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric.
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Builds metric names with the convention `vgw_{phase}_{name}[_total]`.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("vgw_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("vgw_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
