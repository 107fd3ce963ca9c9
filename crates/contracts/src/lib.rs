//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the bridge.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data flow
//! - `OscEvent` is produced by the wire listener
//! - `Contact` / `Binding` are authored externally and supplied as snapshots
//! - `ReactionSink` is the capability interface output modules implement

mod binding;
mod config;
mod contact;
mod error;
mod event;
mod sink;

pub use binding::*;
pub use config::*;
pub use contact::*;
pub use error::*;
pub use event::{OscArg, OscEvent, OscEventCallback};
pub use sink::*;
