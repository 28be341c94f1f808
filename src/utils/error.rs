/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use crate::subscription::SubscriptionHandle;
use thiserror::Error;

/// Errors reported by a [`Transport`](crate::client::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying connection is gone
    #[error("connection closed")]
    ConnectionClosed,
    /// The frame could not be handed to the connection
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// An inbound frame that does not fit the protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The bytes are not a recognised frame
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The frame is well formed but not expected in the current state
    #[error("unexpected {frame} frame while {state}")]
    UnexpectedFrame {
        /// Frame command
        frame: &'static str,
        /// Connection state at arrival
        state: &'static str,
    },
    /// The server reported an error
    #[error("server error: {0}")]
    Server(String),
}

/// A wire value that cannot be turned into a gauge value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Spectrum anchors must satisfy `i <= j <= 54`
    #[error("invalid spectrum indices i={i} j={j}")]
    InvalidSpectrumIndices {
        /// Index of the first anchor
        i: usize,
        /// Index of the second anchor
        j: usize,
    },
    /// The record type does not belong to the subscription's destination
    #[error("expected {expected} record, got {found}")]
    UnexpectedRecord {
        /// Record type the destination produces
        expected: &'static str,
        /// Record type received
        found: &'static str,
    },
}

/// Errors returned to callers of the session API.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The handle was never registered or has been unsubscribed
    #[error("unknown subscription: {0}")]
    UnknownSubscription(SubscriptionHandle),
    /// The session was closed explicitly
    #[error("session closed")]
    Closed,
    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
