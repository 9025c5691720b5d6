//! Shared test fixtures: an in-process STOMP-speaking broker and helpers to
//! stand up the gateway against it.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use vehicle_gateway::app::submit::Submitter;
use vehicle_gateway::broker::BrokerConnection;
use vehicle_gateway::config::ArtemisConfig;
use vehicle_gateway::server::{create_router, AppState};
use vehicle_gateway::stomp::frame::{read_frame, Frame};

/// Minimal broker double: answers CONNECT with CONNECTED and records every
/// frame it receives.
pub struct MockBroker {
    pub addr: SocketAddr,
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl MockBroker {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let frames = Arc::new(Mutex::new(Vec::new()));

        let accepted = frames.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, accepted.clone()));
            }
        });

        MockBroker { addr, frames }
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .filter(|frame| frame.command == command)
            .count()
    }

    /// Polls until the broker has seen `expected` frames of the given
    /// command; sends are fire-and-forget so the HTTP response can land
    /// before the frame does.
    pub async fn wait_for(&self, command: &str, expected: usize) {
        for _ in 0..100 {
            if self.count(command) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {expected} {command} frames, saw {}",
            self.count(command)
        );
    }
}

async fn handle_connection(stream: TcpStream, frames: Arc<Mutex<Vec<Frame>>>) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    loop {
        let Ok(frame) = read_frame(&mut reader).await else {
            break;
        };
        let command = frame.command.clone();
        frames.lock().unwrap().push(frame);
        match command.as_str() {
            "CONNECT" => {
                let reply = b"CONNECTED\nversion:1.2\nheart-beat:10000,10000\n\n\0";
                if write_half.write_all(reply).await.is_err() {
                    break;
                }
            }
            "DISCONNECT" => break,
            _ => {}
        }
    }
}

pub fn artemis_config(addr: SocketAddr) -> ArtemisConfig {
    ArtemisConfig {
        host: "127.0.0.1".to_string(),
        port: addr.port(),
        user: "admin".to_string(),
        password: "admin".to_string(),
        queue: "test.events".to_string(),
        heartbeat_secs: 10,
        connect_timeout_secs: 2,
    }
}

/// An address nothing is listening on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Binds the gateway's HTTP server on an ephemeral port.
pub async fn spawn_gateway(artemis: ArtemisConfig) -> (SocketAddr, Arc<BrokerConnection>) {
    let broker = Arc::new(BrokerConnection::new(artemis));
    let state = AppState {
        broker: broker.clone(),
        submitter: Arc::new(Submitter::new(broker.clone())),
    };

    let app = create_router(state);
    let server = hyper::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);

    (addr, broker)
}
