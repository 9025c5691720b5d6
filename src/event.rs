use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Origin tag stamped on every event this gateway produces.
pub const SOURCE_TAG: &str = "vehicle-gateway";

pub const DEFAULT_LICENSE_PLATE: &str = "UNKNOWN";
pub const DEFAULT_VEHICLE_TYPE: &str = "CAR";
pub const DEFAULT_EVENT_TYPE: &str = "DETECTION";

/// Canonical unit forwarded to the broker.
///
/// Serialized with camelCase keys; optional fields absent from the input are
/// omitted from the wire form entirely rather than sent as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEvent {
    pub id: Uuid,
    pub license_plate: String,
    pub vehicle_type: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Number>,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Resolve a string field by primary key first, alternate key second.
fn string_field(payload: &Map<String, Value>, keys: [&str; 2], default: &str) -> String {
    keys.iter()
        .find_map(|key| payload.get(*key))
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Copy an optional numeric field through unchanged when present.
fn number_field(payload: &Map<String, Value>, key: &str) -> Option<Number> {
    match payload.get(key) {
        Some(Value::Number(number)) => Some(number.clone()),
        _ => None,
    }
}

impl VehicleEvent {
    /// Normalizes an arbitrary caller-supplied mapping into a canonical event.
    ///
    /// Never fails: missing required fields get documented defaults, a fresh
    /// id and a UTC timestamp are assigned on every call.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        VehicleEvent {
            id: Uuid::new_v4(),
            license_plate: string_field(
                payload,
                ["licensePlate", "license_plate"],
                DEFAULT_LICENSE_PLATE,
            ),
            vehicle_type: string_field(
                payload,
                ["vehicleType", "vehicle_type"],
                DEFAULT_VEHICLE_TYPE,
            ),
            event_type: string_field(payload, ["eventType", "event_type"], DEFAULT_EVENT_TYPE),
            latitude: number_field(payload, "latitude"),
            longitude: number_field(payload, "longitude"),
            speed: number_field(payload, "speed"),
            direction: number_field(payload, "direction"),
            source: SOURCE_TAG.to_string(),
            timestamp: Utc::now(),
        }
    }
}
