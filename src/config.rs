use crate::error::{GatewayError, Result};

/// Broker connection settings, sourced from the environment.
#[derive(Debug, Clone)]
pub struct ArtemisConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub queue: String,
    /// Symmetric heart-beat interval advertised in the CONNECT frame.
    pub heartbeat_secs: u64,
    /// Bound on TCP connect plus STOMP handshake.
    pub connect_timeout_secs: u64,
}

impl ArtemisConfig {
    /// The STOMP destination events are published to.
    pub fn destination(&self) -> String {
        format!("/queue/{}", self.queue)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub artemis: ArtemisConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Tests pass a map here instead
    /// of mutating process-wide environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            artemis: ArtemisConfig {
                host: string_or(&lookup, "ARTEMIS_HOST", "localhost"),
                port: parse_or(&lookup, "ARTEMIS_PORT", 61613)?,
                user: string_or(&lookup, "ARTEMIS_USER", "admin"),
                password: string_or(&lookup, "ARTEMIS_PASSWORD", "admin"),
                queue: string_or(&lookup, "ARTEMIS_QUEUE", "vehicle.events"),
                heartbeat_secs: parse_or(&lookup, "ARTEMIS_HEARTBEAT_SECS", 10)?,
                connect_timeout_secs: parse_or(&lookup, "ARTEMIS_CONNECT_TIMEOUT_SECS", 5)?,
            },
            server: ServerConfig {
                host: string_or(&lookup, "HTTP_HOST", "0.0.0.0"),
                port: parse_or(&lookup, "HTTP_PORT", 5000)?,
            },
        })
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| GatewayError::Config(format!("invalid value for {key}: '{raw}'"))),
        None => Ok(default),
    }
}
