//! Ingestion error types

use std::net::SocketAddr;

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// UDP socket could not be bound
    #[error("failed to bind OSC socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Datagram is not a valid OSC packet
    #[error("failed to decode OSC packet: {message}")]
    Decode { message: String },

    /// Listener already running
    #[error("OSC listener already running on {addr}")]
    AlreadyRunning { addr: SocketAddr },

    /// Delivery thread for a listener could not be started
    #[error("failed to start OSC listener worker: {source}")]
    ListenerSpawn {
        #[source]
        source: std::io::Error,
    },

    /// Listener not running
    #[error("OSC listener is not running")]
    NotRunning,
}

impl IngestionError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
