//! Engine.IO v4 / Socket.IO v5 text framing, default namespace only.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO open, sent once by the server.
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connect; the client sends its auth object, the server its sid.
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(Value),
}

pub fn encode(packet: &Packet) -> String {
    match packet {
        Packet::Open(handshake) => format!(
            "0{}",
            serde_json::json!({
                "sid": handshake.sid,
                "pingInterval": handshake.ping_interval,
                "pingTimeout": handshake.ping_timeout,
            })
        ),
        Packet::Close => "1".to_string(),
        Packet::Ping => "2".to_string(),
        Packet::Pong => "3".to_string(),
        Packet::Noop => "6".to_string(),
        Packet::Connect(None) => "40".to_string(),
        Packet::Connect(Some(auth)) => format!("40{auth}"),
        Packet::Disconnect => "41".to_string(),
        Packet::Event { name, payload } => {
            format!("42{}", Value::Array(vec![Value::String(name.clone()), payload.clone()]))
        }
        Packet::ConnectError(detail) => format!("44{detail}"),
    }
}

pub fn decode(frame: &str) -> Result<Packet> {
    let mut chars = frame.chars();
    let engine = chars
        .next()
        .ok_or_else(|| ClientError::Protocol("empty frame".to_string()))?;
    let rest = chars.as_str();

    match engine {
        '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(rest),
        '6' => Ok(Packet::Noop),
        other => Err(ClientError::Protocol(format!(
            "unsupported engine packet type `{other}`"
        ))),
    }
}

fn decode_socket(body: &str) -> Result<Packet> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ClientError::Protocol("empty socket packet".to_string()))?;
    let rest = chars.as_str();

    if rest.starts_with('/') {
        return Err(ClientError::Protocol(format!(
            "packet for foreign namespace: {body}"
        )));
    }

    match kind {
        '0' if rest.is_empty() => Ok(Packet::Connect(None)),
        '0' => Ok(Packet::Connect(Some(serde_json::from_str(rest)?))),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(rest),
        '4' => Ok(Packet::ConnectError(
            serde_json::from_str(rest).unwrap_or(Value::String(rest.to_string())),
        )),
        other => Err(ClientError::Protocol(format!(
            "unsupported socket packet type `{other}`"
        ))),
    }
}

fn decode_event(body: &str) -> Result<Packet> {
    // an ack id may precede the argument array
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let args: Vec<Value> = serde_json::from_str(body)?;
    let mut args = args.into_iter();

    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => {
            return Err(ClientError::Protocol(
                "event without a name".to_string(),
            ));
        }
    };

    Ok(Packet::Event {
        name,
        payload: args.next().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_open_handshake() {
        let packet =
            decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#)
                .unwrap();
        assert_eq!(
            packet,
            Packet::Open(Handshake {
                sid: "abc".into(),
                ping_interval: 25_000,
                ping_timeout: 20_000,
            })
        );
    }

    #[test]
    fn decodes_event_with_payload() {
        let packet = decode(r#"42["request:new",{"from":"carol"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "request:new".into(),
                payload: json!({"from": "carol"})
            }
        );
    }

    #[test]
    fn event_with_ack_id_and_no_args() {
        let packet = decode(r#"4217["ping_me"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "ping_me".into(),
                payload: Value::Null
            }
        );
    }

    #[test]
    fn connect_carries_auth() {
        let frame = encode(&Packet::Connect(Some(json!({"token": "t0k"}))));
        assert_eq!(frame, r#"40{"token":"t0k"}"#);
        assert_eq!(decode("40").unwrap(), Packet::Connect(None));
    }

    #[test]
    fn heartbeat_and_errors() {
        assert_eq!(decode("2").unwrap(), Packet::Ping);
        assert_eq!(encode(&Packet::Pong), "3");
        assert!(matches!(
            decode(r#"44{"message":"unauthorized"}"#).unwrap(),
            Packet::ConnectError(_)
        ));
        assert!(decode("").is_err());
        assert!(decode("42[1,2]").is_err());
        assert!(decode("40/admin,").is_err());
    }

    #[test]
    fn emitted_event_frame() {
        let frame = encode(&Packet::Event {
            name: "chat_read".into(),
            payload: json!({"me": "alice", "friend": "bob"}),
        });
        assert_eq!(decode(&frame).unwrap(), Packet::Event {
            name: "chat_read".into(),
            payload: json!({"me": "alice", "friend": "bob"}),
        });
    }
}
