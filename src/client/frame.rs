/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Wire frames exchanged with the server.
//!
//! Each frame is one JSON object whose `command` member names the frame.
//! Receipt ids of zero mean "no receipt" and are left off the wire.

use crate::subscription::GaugeRecord;
use crate::utils::ProtocolError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    /// Opens the session
    Connect {
        /// Bearer credential, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        credential: Option<String>,
        /// Protocol version offered
        accept_version: String,
        /// Heartbeat interval the client will keep; 0 disables it
        heart_beat_ms: u64,
        /// Identifier of the client application
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },
    /// Starts a stream
    Subscribe {
        /// Destination string
        destination: String,
        /// Subscription id the server tags push frames with
        id: u64,
        /// Minimum interval between updates; 0 is unthrottled
        throttle_ms: u32,
        /// Receipt id
        #[serde(default, skip_serializing_if = "is_zero")]
        receipt: u64,
    },
    /// Stops a stream
    Unsubscribe {
        /// Subscription id
        id: u64,
        /// Receipt id
        #[serde(default, skip_serializing_if = "is_zero")]
        receipt: u64,
    },
    /// Changes the throttle rate of a stream
    Throttle {
        /// Subscription id
        id: u64,
        /// New minimum interval between updates
        throttle_ms: u32,
        /// Receipt id
        #[serde(default, skip_serializing_if = "is_zero")]
        receipt: u64,
    },
    /// One-shot message to a destination
    Send {
        /// Destination string
        destination: String,
        /// Opaque payload
        body: Vec<u8>,
        /// Receipt id
        #[serde(default, skip_serializing_if = "is_zero")]
        receipt: u64,
    },
    /// Keeps the connection alive
    Heartbeat,
    /// Ends the session
    Disconnect {
        /// Receipt id
        #[serde(default, skip_serializing_if = "is_zero")]
        receipt: u64,
    },
}

impl ClientFrame {
    /// Serializes the frame for the transport.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Parses a frame previously produced by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Command name, as written on the wire.
    pub fn command(&self) -> &'static str {
        match self {
            ClientFrame::Connect { .. } => "CONNECT",
            ClientFrame::Subscribe { .. } => "SUBSCRIBE",
            ClientFrame::Unsubscribe { .. } => "UNSUBSCRIBE",
            ClientFrame::Throttle { .. } => "THROTTLE",
            ClientFrame::Send { .. } => "SEND",
            ClientFrame::Heartbeat => "HEARTBEAT",
            ClientFrame::Disconnect { .. } => "DISCONNECT",
        }
    }
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerFrame {
    /// The session is open
    Connected {
        /// Heartbeat interval the server will keep
        #[serde(default)]
        heart_beat_ms: u64,
        /// Server-side session identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<String>,
    },
    /// Keeps the connection alive
    Heartbeat,
    /// Acknowledges a receipted request
    Receipt {
        /// Receipt id being acknowledged
        receipt: u64,
    },
    /// Pushes an update for a subscription
    Message {
        /// Subscription id the update belongs to
        subscription: u64,
        /// Gauge record
        body: GaugeRecord,
    },
    /// Reports a server-side error
    Error {
        /// Human readable description
        message: String,
    },
}

impl ServerFrame {
    /// Parses an inbound frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serializes the frame, as a server would.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Command name, as written on the wire.
    pub fn command(&self) -> &'static str {
        match self {
            ServerFrame::Connected { .. } => "CONNECTED",
            ServerFrame::Heartbeat => "HEARTBEAT",
            ServerFrame::Receipt { .. } => "RECEIPT",
            ServerFrame::Message { .. } => "MESSAGE",
            ServerFrame::Error { .. } => "ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_subscribe_wire_format() {
        let frame = ClientFrame::Subscribe {
            destination: "/gauge/price/realtime/IBM".to_string(),
            id: 4,
            throttle_ms: 250,
            receipt: 9,
        };
        let value: Value = serde_json::from_slice(&frame.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "SUBSCRIBE",
                "destination": "/gauge/price/realtime/IBM",
                "id": 4,
                "throttle_ms": 250,
                "receipt": 9
            })
        );
    }

    #[test]
    fn test_zero_receipt_is_omitted() {
        let frame = ClientFrame::Unsubscribe { id: 2, receipt: 0 };
        let value: Value = serde_json::from_slice(&frame.encode().unwrap()).unwrap();
        assert_eq!(value, json!({"command": "UNSUBSCRIBE", "id": 2}));
        assert_eq!(ClientFrame::decode(&frame.encode().unwrap()).unwrap(), frame);
    }

    #[test]
    fn test_heartbeat_and_connect() {
        let value: Value =
            serde_json::from_slice(&ClientFrame::Heartbeat.encode().unwrap()).unwrap();
        assert_eq!(value, json!({"command": "HEARTBEAT"}));

        let connect = ClientFrame::Connect {
            credential: None,
            accept_version: "1.2".to_string(),
            heart_beat_ms: 0,
            client_id: None,
        };
        let value: Value = serde_json::from_slice(&connect.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"command": "CONNECT", "accept_version": "1.2", "heart_beat_ms": 0})
        );
    }

    #[test]
    fn test_server_message_decode() {
        let frame = ServerFrame::decode(
            br#"{"command":"MESSAGE","subscription":3,"body":{"type":"price","price":5}}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ServerFrame::Message {
                subscription: 3,
                body: GaugeRecord::Price { price: 5 }
            }
        );
        assert_eq!(frame.command(), "MESSAGE");
    }

    #[test]
    fn test_connected_defaults() {
        let frame = ServerFrame::decode(br#"{"command":"CONNECTED"}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::Connected {
                heart_beat_ms: 0,
                session: None
            }
        );
    }

    #[test]
    fn test_malformed_frames() {
        assert!(matches!(
            ServerFrame::decode(b"not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(ServerFrame::decode(br#"{"command":"BOGUS"}"#).is_err());
        assert!(ServerFrame::decode(br#"{"command":"RECEIPT"}"#).is_err());
    }
}
