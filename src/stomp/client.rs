use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::ArtemisConfig;
use crate::error::{GatewayError, Result};
use crate::stomp::frame::{read_frame, Frame};

/// A live STOMP session over TCP.
///
/// Created by a successful CONNECT/CONNECTED handshake; dropped (or
/// explicitly disconnected) to tear the connection down. While the session
/// lives, a background writer emits heart-beat EOLs at the negotiated
/// cadence and a drain task discards inbound server traffic so server
/// heart-beats cannot back up the socket.
pub struct StompClient {
    writer: Arc<Mutex<OwnedWriteHalf>>,
    heartbeat: Option<JoinHandle<()>>,
    drain: JoinHandle<()>,
}

impl StompClient {
    /// Opens a TCP connection and performs the STOMP handshake.
    ///
    /// Both the TCP connect and the wait for the broker's reply are bounded
    /// by the configured connect timeout.
    pub async fn connect(config: &ArtemisConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let timeout = Duration::from_secs(config.connect_timeout_secs);

        let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| GatewayError::Connection(format!("connect to {addr} timed out")))?
            .map_err(|e| GatewayError::Connection(format!("connect to {addr} failed: {e}")))?;

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let heartbeat_ms = config.heartbeat_secs * 1000;
        let connect = Frame::new("CONNECT")
            .header("accept-version", "1.2")
            .header("host", &config.host)
            .header("login", &config.user)
            .header("passcode", &config.password)
            .header("heart-beat", &format!("{heartbeat_ms},{heartbeat_ms}"));

        write_half
            .write_all(&connect.encode())
            .await
            .map_err(|e| GatewayError::Connection(format!("handshake write failed: {e}")))?;

        let reply = tokio::time::timeout(timeout, read_frame(&mut reader))
            .await
            .map_err(|_| GatewayError::Connection("handshake timed out".to_string()))?
            .map_err(|e| GatewayError::Connection(format!("handshake read failed: {e}")))?;

        match reply.command.as_str() {
            "CONNECTED" => {}
            "ERROR" => {
                let reason = reply
                    .get_header("message")
                    .map(str::to_string)
                    .unwrap_or_else(|| String::from_utf8_lossy(&reply.body).into_owned());
                return Err(GatewayError::Connection(format!(
                    "broker rejected handshake: {reason}"
                )));
            }
            other => {
                return Err(GatewayError::Connection(format!(
                    "unexpected {other} frame during handshake"
                )))
            }
        }

        let writer = Arc::new(Mutex::new(write_half));
        let heartbeat = send_period(heartbeat_ms, &reply)
            .map(|period| spawn_heartbeat(Arc::clone(&writer), period));
        let drain = spawn_drain(reader);

        Ok(StompClient {
            writer,
            heartbeat,
            drain,
        })
    }

    /// Publishes a JSON body to the given destination.
    pub async fn send(&mut self, destination: &str, body: &[u8]) -> Result<()> {
        let frame = Frame::new("SEND")
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", &body.len().to_string())
            .body(body.to_vec());
        self.write_frame(&frame)
            .await
            .map_err(|e| GatewayError::Send(format!("publish to {destination} failed: {e}")))
    }

    /// Best-effort graceful close: DISCONNECT frame, then socket shutdown.
    pub async fn disconnect(self) {
        // Stop heart-beats first so none interleaves with the DISCONNECT.
        if let Some(handle) = &self.heartbeat {
            handle.abort();
        }
        let mut writer = self.writer.lock().await;
        let _ = writer.write_all(&Frame::new("DISCONNECT").encode()).await;
        let _ = writer.shutdown().await;
    }

    async fn write_frame(&self, frame: &Frame) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&frame.encode()).await?;
        writer.flush().await
    }
}

impl Drop for StompClient {
    fn drop(&mut self) {
        if let Some(handle) = &self.heartbeat {
            handle.abort();
        }
        self.drain.abort();
    }
}

/// Cadence at which this client must emit heart-beats, per the STOMP
/// negotiation: `max(what we offered, what the server wants)`, or none at
/// all when either side advertised zero.
fn send_period(offered_ms: u64, connected: &Frame) -> Option<Duration> {
    let (_, server_wants) = parse_heartbeat_header(connected.get_header("heart-beat")?)?;
    if offered_ms == 0 || server_wants == 0 {
        return None;
    }
    Some(Duration::from_millis(offered_ms.max(server_wants)))
}

fn parse_heartbeat_header(value: &str) -> Option<(u64, u64)> {
    let (sx, sy) = value.split_once(',')?;
    Some((sx.trim().parse().ok()?, sy.trim().parse().ok()?))
}

/// Emits an EOL every period to keep the negotiated liveness promise.
/// Exits on the first write failure; the next send notices the dead
/// transport and triggers the usual reconnect.
fn spawn_heartbeat(writer: Arc<Mutex<OwnedWriteHalf>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut writer = writer.lock().await;
            if writer.write_all(b"\n").await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    })
}

/// Discards inbound traffic after the handshake. The gateway never
/// subscribes, so everything the server sends past CONNECTED is either a
/// heart-beat or an ERROR we cannot act on mid-send.
fn spawn_drain(reader: BufReader<OwnedReadHalf>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = reader;
        let mut sink = tokio::io::sink();
        let _ = tokio::io::copy(&mut reader, &mut sink).await;
    })
}
