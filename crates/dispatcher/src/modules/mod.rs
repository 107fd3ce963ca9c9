//! Built-in output modules
//!
//! Contains LogModule and OscForwardModule.

mod log;
mod osc_forward;

pub use self::log::LogModule;
pub use self::osc_forward::{OscForwardConfig, OscForwardModule};
