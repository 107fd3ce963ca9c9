//! # Ingestion
//!
//! OSC wire listener.
//!
//! Responsibilities:
//! - Bind a UDP socket and run the receive loop on its own task
//! - Decode datagrams into `OscEvent`s (bundles flattened)
//! - Queue each event to a dynamic set of listeners, each drained on its own
//!   thread so a slow or failing listener never starves the others
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::OscListener;
//! use std::sync::Arc;
//!
//! let mut listener = OscListener::new();
//! let id = listener.add_listener(Arc::new(|event| {
//!     println!("{} {:?}", event.address, event.args);
//! }))?;
//! listener.start(9001).await?;
//! // ...
//! listener.remove_listener(id);
//! listener.stop().await?;
//! ```

mod config;
mod decode;
mod error;
mod listener;
mod registry;
mod tracker;

// Re-exports
pub use config::{IngestionMetrics, ListenerConfig, MetricsSnapshot};
pub use contracts::{OscArg, OscEvent, OscEventCallback};
pub use decode::decode_datagram;
pub use error::{IngestionError, Result};
pub use listener::OscListener;
pub use registry::{ListenerId, ListenerRegistry};
pub use tracker::{AddressSample, AddressTracker, AddressUpdate};
