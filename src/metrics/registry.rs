//! Registration of all phase metrics, with early conflict detection.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{info, warn};

/// Register the metrics of every phase and validate naming consistency.
pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::broker::BrokerMetrics>(&mut all_metrics);
    register_phase_metrics::<super::sender::SenderMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();
    let phase_docs = T::metrics_documentation();

    info!(
        "Registering {} metrics for phase '{}'",
        phase_docs.len(),
        phase_name
    );

    for doc in phase_docs {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' redefined by phase '{}'",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_do_not_collide() {
        let mut all_metrics = HashMap::new();
        register_phase_metrics::<crate::metrics::broker::BrokerMetrics>(&mut all_metrics);
        register_phase_metrics::<crate::metrics::sender::SenderMetrics>(&mut all_metrics);
        assert_eq!(all_metrics.len(), 8);
    }
}
