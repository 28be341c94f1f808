/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use crate::subscription::destination::Destination;
use crate::subscription::listener::SubscriptionListener;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Caller-visible identity of a subscription.
///
/// Unlike the wire subscription id, a handle never changes when the session
/// transparently resubscribes after a reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the handle.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Description of a stream the caller wants to receive.
///
/// A `Subscription` is handed to [`Session::subscribe`](crate::client::Session::subscribe),
/// which takes its own copy. Subscribing the same description (or a clone of
/// it) twice is a no-op, since both carry the same handle.
#[derive(Clone)]
pub struct Subscription {
    handle: SubscriptionHandle,
    destination: Destination,
    throttle_rate_ms: u32,
    listeners: Vec<Arc<dyn SubscriptionListener>>,
}

impl Subscription {
    /// Creates an unthrottled subscription to `destination`.
    pub fn new(destination: Destination) -> Self {
        Self {
            handle: SubscriptionHandle::next(),
            destination,
            throttle_rate_ms: 0,
            listeners: Vec::new(),
        }
    }

    /// Sets the initial minimum interval between updates, in milliseconds.
    /// Zero means unthrottled.
    #[must_use]
    pub fn with_throttle_rate(mut self, throttle_rate_ms: u32) -> Self {
        self.throttle_rate_ms = throttle_rate_ms;
        self
    }

    /// Adds a listener notified of updates and lifecycle events.
    pub fn add_listener(&mut self, listener: Arc<dyn SubscriptionListener>) {
        self.listeners.push(listener);
    }

    /// Stable handle of this subscription.
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    /// Structured destination.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Requested throttle rate in milliseconds.
    pub fn throttle_rate_ms(&self) -> u32 {
        self.throttle_rate_ms
    }

    pub(crate) fn listeners(&self) -> &[Arc<dyn SubscriptionListener>] {
        &self.listeners
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .field("destination", &self.destination.to_string())
            .field("throttle_rate_ms", &self.throttle_rate_ms)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
