//! OscForwardModule - forwards reactions as OSC over UDP
//!
//! Dedicated reactions are sent to `<prefix>/<device_id>/<reaction>` with
//! `[intensity, duration]`; anything else goes to `<prefix>/<device_id>/event`
//! with `[reaction, intensity, duration]`.

use std::collections::{HashMap, HashSet};
use std::net::{SocketAddr, UdpSocket};

use contracts::{Binding, ContractError, DeviceInfo, ReactionSink};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use tracing::{debug, instrument, trace};

const DEFAULT_PREFIX: &str = "/haptics";
const DEFAULT_REACTIONS: &[&str] = &["vibrate", "shock", "beep", "stop"];
const DEFAULT_DEVICE: &str = "default";

/// Configuration for OscForwardModule
#[derive(Debug, Clone)]
pub struct OscForwardConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Address prefix
    pub prefix: String,
    /// Reactions with a dedicated address
    pub reactions: HashSet<String>,
    /// Forward unknown reactions through the generic handler
    pub fallback: bool,
}

impl OscForwardConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let prefix = params
            .get("prefix")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if !prefix.starts_with('/') {
            return Err(format!("prefix '{}' must start with '/'", prefix));
        }

        let reactions = match params.get("reactions") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_REACTIONS.iter().map(|r| r.to_string()).collect(),
        };

        let fallback = match params.get("fallback").map(String::as_str) {
            Some("true") | None => true,
            Some("false") => false,
            Some(other) => return Err(format!("invalid fallback flag '{}'", other)),
        };

        Ok(Self {
            addr,
            prefix,
            reactions,
            fallback,
        })
    }
}

/// Module that relays reactions to an external OSC endpoint
pub struct OscForwardModule {
    name: String,
    config: OscForwardConfig,
    socket: UdpSocket,
}

impl OscForwardModule {
    /// Create a new OscForwardModule bound to an ephemeral local port
    #[instrument(name = "osc_forward_new", skip(name, config))]
    pub fn new(name: impl Into<String>, config: OscForwardConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr: SocketAddr = if config.addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(config.addr)?;

        debug!(module = %name, target = %config.addr, "OscForwardModule connected");

        Ok(Self {
            name,
            config,
            socket,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = OscForwardConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("modules[{name}].params"), e))?;

        Self::new(&name, config).map_err(|e| ContractError::device(&name, e.to_string()))
    }

    fn device_path(&self, binding: &Binding, leaf: &str) -> String {
        let device = if binding.device_id.is_empty() {
            DEFAULT_DEVICE
        } else {
            binding.device_id.as_str()
        };
        format!("{}/{}/{}", self.config.prefix, device, leaf)
    }

    fn send(&self, addr: String, args: Vec<OscType>, reaction: &str) -> Result<(), ContractError> {
        let packet = OscPacket::Message(OscMessage { addr, args });
        let bytes = encoder::encode(&packet)
            .map_err(|e| ContractError::reaction(&self.name, reaction, format!("{e:?}")))?;

        self.socket
            .send(&bytes)
            .map_err(|e| ContractError::reaction(&self.name, reaction, e.to_string()))?;
        trace!(module = %self.name, reaction, bytes = bytes.len(), "OSC reaction sent");
        Ok(())
    }
}

impl ReactionSink for OscForwardModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, reaction_type: &str) -> bool {
        self.config.reactions.contains(reaction_type)
    }

    fn react(&self, reaction_type: &str, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
        if !self.supports(reaction_type) {
            return Err(ContractError::unsupported_reaction(&self.name, reaction_type));
        }
        let addr = self.device_path(binding, reaction_type);
        let args = vec![
            OscType::Float(intensity as f32),
            OscType::Float(binding.duration as f32),
        ];
        self.send(addr, args, reaction_type)
    }

    fn has_fallback(&self) -> bool {
        self.config.fallback
    }

    fn handle_event(&self, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
        if !self.config.fallback {
            return Err(ContractError::unsupported_reaction(
                &self.name,
                &binding.reaction_type,
            ));
        }
        let addr = self.device_path(binding, "event");
        let args = vec![
            OscType::String(binding.reaction_type.clone()),
            OscType::Float(intensity as f32),
            OscType::Float(binding.duration as f32),
        ];
        self.send(addr, args, &binding.reaction_type)
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        vec![DeviceInfo::new(
            self.config.addr.to_string(),
            format!("OSC endpoint {}", self.config.addr),
            "Connected",
        )]
    }
}
