//! OscEvent - wire listener output
//!
//! A decoded OSC message: address plus ordered, typed arguments.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Typed OSC argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OscArg {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl OscArg {
    /// Numeric view of the value
    ///
    /// Booleans become 1.0 / 0.0, strings are parsed, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// `false` or numeric zero
    pub fn is_stop_signal(&self) -> bool {
        match self {
            Self::Bool(b) => !*b,
            other => other.as_f64() == Some(0.0),
        }
    }

    /// `true` or a numeric value above zero
    pub fn is_active(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            other => other.as_f64().is_some_and(|v| v > 0.0),
        }
    }

    /// Short type tag for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for OscArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for OscArg {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for OscArg {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Decoded inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscEvent {
    /// OSC address (e.g. `/avatar/parameters/LeftHand`)
    pub address: String,

    /// Ordered arguments
    pub args: Vec<OscArg>,
}

impl OscEvent {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Event with a single argument
    pub fn single(address: impl Into<String>, value: impl Into<OscArg>) -> Self {
        Self::new(address, vec![value.into()])
    }

    /// First argument, the raw value for routing
    pub fn value(&self) -> Option<&OscArg> {
        self.args.first()
    }
}

/// Listener callback invoked once per decoded message
pub type OscEventCallback = Arc<dyn Fn(&OscEvent) + Send + Sync>;
