use async_trait::async_trait;

use crate::error::Result;
use crate::event::VehicleEvent;

/// Sink the submission gateway forwards normalized events through.
///
/// Implemented by `BrokerConnection` in production; test doubles stand in
/// for it to exercise batch isolation without a broker.
#[async_trait]
pub trait EventSinkPort: Send + Sync {
    async fn send(&self, event: &VehicleEvent) -> Result<()>;
}
