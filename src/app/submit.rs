use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::app::ports::EventSinkPort;
use crate::error::{GatewayError, Result};
use crate::event::VehicleEvent;
use crate::metrics::sender::SenderMetrics;

/// Per-element outcome of a batch submission, in input order.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItemOutcome {
    Sent {
        success: bool,
        #[serde(rename = "licensePlate")]
        license_plate: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl BatchItemOutcome {
    fn sent(license_plate: String) -> Self {
        BatchItemOutcome::Sent {
            success: true,
            license_plate,
        }
    }

    fn failed(error: String) -> Self {
        BatchItemOutcome::Failed {
            success: false,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchItemOutcome::Sent { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub results: Vec<BatchItemOutcome>,
}

/// Orchestrates normalize → send → record for single and batch submissions.
pub struct Submitter {
    sink: Arc<dyn EventSinkPort>,
}

impl Submitter {
    pub fn new(sink: Arc<dyn EventSinkPort>) -> Self {
        Submitter { sink }
    }

    /// Normalizes and forwards one event, recording latency on success.
    pub async fn submit_one(&self, payload: &Map<String, Value>) -> Result<VehicleEvent> {
        let started = Instant::now();
        let event = VehicleEvent::from_payload(payload);
        match self.sink.send(&event).await {
            Ok(()) => {
                SenderMetrics::record_message_sent();
                SenderMetrics::record_send_duration(started.elapsed().as_secs_f64());
                info!(plate = %event.license_plate, "Sent event");
                Ok(event)
            }
            Err(e) => {
                SenderMetrics::record_message_failed();
                warn!("Failed to send event: {e}");
                Err(e)
            }
        }
    }

    /// Submits each batch element independently; one element failing must
    /// not prevent the remaining elements from being attempted.
    ///
    /// A single mapping is coerced to a one-element batch. A body that is
    /// neither a mapping nor an array is a batch-level hard failure.
    pub async fn submit_batch(&self, body: Value) -> Result<BatchSummary> {
        let elements = match body {
            Value::Array(items) => items,
            Value::Object(_) => vec![body],
            other => {
                return Err(GatewayError::Validation(format!(
                    "batch body must be an object or an array of objects, got {}",
                    json_type_name(&other)
                )))
            }
        };

        SenderMetrics::record_batch_size(elements.len());

        let mut results = Vec::with_capacity(elements.len());
        for element in &elements {
            let outcome = match element.as_object() {
                Some(payload) => match self.submit_element(payload).await {
                    Ok(event) => BatchItemOutcome::sent(event.license_plate),
                    Err(e) => BatchItemOutcome::failed(e.to_string()),
                },
                None => {
                    SenderMetrics::record_message_failed();
                    BatchItemOutcome::failed(format!(
                        "batch element must be an object, got {}",
                        json_type_name(element)
                    ))
                }
            };
            results.push(outcome);
        }

        let successful = results.iter().filter(|r| r.is_success()).count();
        info!(
            total = results.len(),
            successful, "Batch submission finished"
        );
        Ok(BatchSummary {
            total: results.len(),
            successful,
            results,
        })
    }

    async fn submit_element(&self, payload: &Map<String, Value>) -> Result<VehicleEvent> {
        let event = VehicleEvent::from_payload(payload);
        match self.sink.send(&event).await {
            Ok(()) => {
                SenderMetrics::record_message_sent();
                Ok(event)
            }
            Err(e) => {
                SenderMetrics::record_message_failed();
                Err(e)
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
