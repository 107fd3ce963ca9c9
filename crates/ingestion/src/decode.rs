//! OSC datagram decoding
//!
//! Bundles are flattened; each contained message becomes one `OscEvent`.
//! A message carrying an argument type with no scalar meaning is dropped as a
//! whole, so `args[0]` is always the first argument on the wire.

use contracts::{OscArg, OscEvent};
use rosc::{OscPacket, OscType};
use tracing::{debug, trace};

use crate::error::{IngestionError, Result};

/// Decode one UDP datagram into events
pub fn decode_datagram(data: &[u8]) -> Result<Vec<OscEvent>> {
    let (_, packet) =
        rosc::decoder::decode_udp(data).map_err(|e| IngestionError::decode(format!("{e:?}")))?;

    let mut events = Vec::new();
    flatten(packet, &mut events);
    Ok(events)
}

fn flatten(packet: OscPacket, out: &mut Vec<OscEvent>) {
    match packet {
        OscPacket::Message(msg) => {
            let args: Option<Vec<OscArg>> = msg.args.into_iter().map(convert_arg).collect();
            match args {
                Some(args) => out.push(OscEvent::new(msg.addr, args)),
                None => debug!(address = %msg.addr, "dropping OSC message with unsupported argument"),
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}

/// Map wire types onto the engine's value model
///
/// Types without a scalar meaning (blob, time, color, midi, nil, ...) yield `None`.
fn convert_arg(arg: OscType) -> Option<OscArg> {
    match arg {
        OscType::Bool(v) => Some(OscArg::Bool(v)),
        OscType::Int(v) => Some(OscArg::Int(v.into())),
        OscType::Long(v) => Some(OscArg::Int(v)),
        OscType::Float(v) => Some(OscArg::Float(v.into())),
        OscType::Double(v) => Some(OscArg::Float(v)),
        OscType::String(v) => Some(OscArg::String(v)),
        OscType::Char(c) => Some(OscArg::String(c.to_string())),
        other => {
            trace!(arg = ?other, "unsupported OSC argument");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{encoder, OscBundle, OscMessage, OscTime};

    fn encode(packet: &OscPacket) -> Vec<u8> {
        encoder::encode(packet).unwrap()
    }

    #[test]
    fn test_decode_single_message() {
        let bytes = encode(&OscPacket::Message(OscMessage {
            addr: "/avatar/parameters/LeftHand".to_string(),
            args: vec![OscType::Float(0.5), OscType::Bool(true), OscType::Int(3)],
        }));

        let events = decode_datagram(&bytes).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].address, "/avatar/parameters/LeftHand");
        assert_eq!(
            events[0].args,
            vec![OscArg::Float(0.5), OscArg::Bool(true), OscArg::Int(3)]
        );
    }

    #[test]
    fn test_decode_bundle_flattens() {
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(OscMessage {
                    addr: "/a".to_string(),
                    args: vec![OscType::Int(1)],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/b".to_string(),
                    args: vec![OscType::String("x".to_string())],
                }),
            ],
        });

        let events = decode_datagram(&encode(&bundle)).unwrap();
        let addresses: Vec<_> = events.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(addresses, vec!["/a", "/b"]);
    }

    #[test]
    fn test_decode_drops_message_with_unsupported_args() {
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(OscMessage {
                    addr: "/nil".to_string(),
                    args: vec![OscType::Nil, OscType::Float(1.0)],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/blob".to_string(),
                    args: vec![OscType::Double(2.0), OscType::Blob(vec![1, 2, 3])],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/ok".to_string(),
                    args: vec![OscType::Float(0.5)],
                }),
            ],
        });

        let events = decode_datagram(&encode(&bundle)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].address, "/ok");
        assert_eq!(events[0].args, vec![OscArg::Float(0.5)]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_datagram(b"not an osc packet");
        assert!(matches!(result, Err(IngestionError::Decode { .. })));
    }
}
