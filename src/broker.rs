use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::app::ports::EventSinkPort;
use crate::config::ArtemisConfig;
use crate::error::{GatewayError, Result};
use crate::event::VehicleEvent;
use crate::metrics::broker::BrokerMetrics;
use crate::stomp::StompClient;

/// Owns the single broker connection.
///
/// Two states: Disconnected (`session` is None) and Connected. A send while
/// disconnected attempts exactly one inline reconnect before publishing; a
/// failed publish drops the session back to Disconnected. The mutex is held
/// across the whole connect-then-publish sequence so racing requests cannot
/// interleave on the transport.
pub struct BrokerConnection {
    config: ArtemisConfig,
    session: Mutex<Option<StompClient>>,
    connected: AtomicBool,
}

impl BrokerConnection {
    pub fn new(config: ArtemisConfig) -> Self {
        BrokerConnection {
            config,
            session: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Lock-free view of the connection state, for status reporting.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ArtemisConfig {
        &self.config
    }

    /// Establishes a fresh connection, replacing any existing session.
    pub async fn connect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        self.connect_locked(&mut session).await
    }

    async fn connect_locked(&self, session: &mut Option<StompClient>) -> Result<()> {
        match StompClient::connect(&self.config).await {
            Ok(client) => {
                *session = Some(client);
                self.connected.store(true, Ordering::SeqCst);
                BrokerMetrics::record_connect();
                info!(
                    host = %self.config.host,
                    port = self.config.port,
                    queue = %self.config.queue,
                    "Connected to Artemis"
                );
                Ok(())
            }
            Err(e) => {
                *session = None;
                self.connected.store(false, Ordering::SeqCst);
                BrokerMetrics::record_connect_failure();
                error!("Failed to connect to Artemis: {e}");
                Err(e)
            }
        }
    }

    /// Publishes one event to the configured queue, reconnecting first if
    /// the prior state was disconnected.
    pub async fn send(&self, event: &VehicleEvent) -> Result<()> {
        let body = serde_json::to_vec(event)
            .map_err(|e| GatewayError::Send(format!("could not serialize event: {e}")))?;

        let mut session = self.session.lock().await;
        if session.is_none() {
            self.connect_locked(&mut session).await?;
        }
        let Some(client) = session.as_mut() else {
            return Err(GatewayError::Connection(
                "no broker session after connect".to_string(),
            ));
        };

        match client.send(&self.config.destination(), &body).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // The transport is suspect after a failed write.
                *session = None;
                self.connected.store(false, Ordering::SeqCst);
                BrokerMetrics::record_session_dropped();
                Err(e)
            }
        }
    }

    /// Gracefully closes the connection. No-op when already disconnected.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(client) = session.take() {
            client.disconnect().await;
            self.connected.store(false, Ordering::SeqCst);
            BrokerMetrics::record_disconnect();
            info!(
                host = %self.config.host,
                port = self.config.port,
                "Disconnected from Artemis"
            );
        }
    }
}

#[async_trait]
impl EventSinkPort for BrokerConnection {
    async fn send(&self, event: &VehicleEvent) -> Result<()> {
        BrokerConnection::send(self, event).await
    }
}
