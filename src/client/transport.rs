/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Collaborators the session relies on but does not implement.
//!
//! The session never opens sockets or refreshes tokens itself. A
//! [`Transport`] moves encoded frames and reports its own lifecycle back by
//! calling the session's transport signals; a [`CredentialProvider`] supplies
//! the bearer string to attach on each connect.

use crate::utils::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, watch};

/// Outbound side of the single shared connection.
///
/// Implementations must not call back into the session from inside these
/// methods; the session holds its state lock while sending.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hands one encoded frame to the connection (fire and forget)
    async fn send(&self, frame: Bytes) -> Result<(), TransportError>;

    /// Asks the connection to shut down
    async fn close(&self) -> Result<(), TransportError>;
}

/// Source of the credential attached to connect frames.
///
/// Read once per connect attempt; refreshing it is the provider's business.
pub trait CredentialProvider: Send + Sync {
    /// The credential to use for the next connect, if any.
    fn current_credential(&self) -> Option<String>;
}

/// A credential that never changes.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    /// A fixed bearer string.
    pub fn new(credential: impl Into<String>) -> Self {
        Self(Some(credential.into()))
    }

    /// Connect without a credential.
    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn current_credential(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Latest value published by an out-of-band refresher.
impl CredentialProvider for watch::Receiver<String> {
    fn current_credential(&self) -> Option<String> {
        let credential = self.borrow();
        if credential.is_empty() {
            None
        } else {
            Some(credential.clone())
        }
    }
}

/// In-process transport that forwards every frame to a channel.
///
/// Useful to drive a session from tests or to bridge it to a connection task
/// owned elsewhere.
#[derive(Debug)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<Bytes>,
    closed: AtomicBool,
}

impl ChannelTransport {
    /// Creates the transport and the receiving end of its frames.
    pub fn create_channel() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (sender, rx) = mpsc::unbounded_channel();
        let transport = Self {
            sender,
            closed: AtomicBool::new(false),
        };
        (transport, rx)
    }

    /// Whether [`Transport::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        self.sender
            .send(frame)
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
