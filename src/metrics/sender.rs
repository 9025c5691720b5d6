//! Sender Phase Metrics
//!
//! Tracks per-send outcomes of the submission gateway: messages forwarded to
//! the broker, failed sends, send latency, and batch sizes.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct SenderMetrics;

impl SenderMetrics {
    pub fn record_message_sent() {
        ::metrics::counter!(phase_metric!(counter, "sender", "messages_sent")).increment(1);
    }

    pub fn record_message_failed() {
        ::metrics::counter!(phase_metric!(counter, "sender", "messages_failed")).increment(1);
    }

    pub fn record_send_duration(duration_secs: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "sender", "send_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_batch_size(size: usize) {
        ::metrics::histogram!(phase_metric!(histogram, "sender", "batch_size"))
            .record(size as f64);
    }
}

impl PhaseMetrics for SenderMetrics {
    fn register_metrics() {
        use metrics::{describe_counter, describe_histogram};

        describe_counter!(
            phase_metric!(counter, "sender", "messages_sent"),
            "Total messages sent to the broker"
        );
        describe_counter!(
            phase_metric!(counter, "sender", "messages_failed"),
            "Total failed message sends"
        );
        describe_histogram!(
            phase_metric!(histogram, "sender", "send_duration_seconds"),
            "Single-event send latency in seconds, normalize through publish"
        );
        describe_histogram!(
            phase_metric!(histogram, "sender", "batch_size"),
            "Number of elements per batch submission"
        );
    }

    fn phase_name() -> &'static str {
        "sender"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "sender", "messages_sent"),
                metric_type: MetricType::Counter,
                help: "Total messages sent to the broker",
            },
            MetricDoc {
                name: phase_metric!(counter, "sender", "messages_failed"),
                metric_type: MetricType::Counter,
                help: "Total failed message sends",
            },
            MetricDoc {
                name: phase_metric!(histogram, "sender", "send_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Single-event send latency in seconds, normalize through publish",
            },
            MetricDoc {
                name: phase_metric!(histogram, "sender", "batch_size"),
                metric_type: MetricType::Histogram,
                help: "Number of elements per batch submission",
            },
        ]
    }
}
