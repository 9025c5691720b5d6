//! Broker Phase Metrics
//!
//! Counters tracking the lifecycle of the STOMP connection: successful
//! connects, failed connects, graceful disconnects, and sessions dropped
//! after a failed publish.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct BrokerMetrics;

impl BrokerMetrics {
    pub fn record_connect() {
        ::metrics::counter!(phase_metric!(counter, "broker", "connects")).increment(1);
    }

    pub fn record_connect_failure() {
        ::metrics::counter!(phase_metric!(counter, "broker", "connect_failures")).increment(1);
    }

    pub fn record_disconnect() {
        ::metrics::counter!(phase_metric!(counter, "broker", "disconnects")).increment(1);
    }

    pub fn record_session_dropped() {
        ::metrics::counter!(phase_metric!(counter, "broker", "sessions_dropped")).increment(1);
    }
}

impl PhaseMetrics for BrokerMetrics {
    fn register_metrics() {
        use metrics::describe_counter;

        describe_counter!(
            phase_metric!(counter, "broker", "connects"),
            "Total successful broker connections"
        );
        describe_counter!(
            phase_metric!(counter, "broker", "connect_failures"),
            "Total failed broker connection attempts"
        );
        describe_counter!(
            phase_metric!(counter, "broker", "disconnects"),
            "Total graceful broker disconnects"
        );
        describe_counter!(
            phase_metric!(counter, "broker", "sessions_dropped"),
            "Total sessions dropped after a failed publish"
        );
    }

    fn phase_name() -> &'static str {
        "broker"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "broker", "connects"),
                metric_type: MetricType::Counter,
                help: "Total successful broker connections",
            },
            MetricDoc {
                name: phase_metric!(counter, "broker", "connect_failures"),
                metric_type: MetricType::Counter,
                help: "Total failed broker connection attempts",
            },
            MetricDoc {
                name: phase_metric!(counter, "broker", "disconnects"),
                metric_type: MetricType::Counter,
                help: "Total graceful broker disconnects",
            },
            MetricDoc {
                name: phase_metric!(counter, "broker", "sessions_dropped"),
                metric_type: MetricType::Counter,
                help: "Total sessions dropped after a failed publish",
            },
        ]
    }
}
