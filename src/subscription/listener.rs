/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use crate::subscription::GaugeUpdate;
use tokio::sync::mpsc;

/// Interface to be implemented to listen to Subscription events: decoded
/// updates, server acknowledgement and local teardown.
///
/// Events are dispatched from the task that feeds inbound frames to the
/// session, while the session's registry is locked. Implementations must not
/// block; hand the event to another task (see [`ChannelSubscriptionListener`])
/// when real work is needed. For a single subscription, updates arrive in
/// frame order.
pub trait SubscriptionListener: Send + Sync {
    /// Event handler called each time a push frame for the subscription has
    /// been decoded.
    ///
    /// # Parameters
    ///
    /// - `update`: the decoded value together with the subscription identity.
    fn on_update(&self, _update: &GaugeUpdate) {}

    /// Event handler called once per connection when the subscription is
    /// active on the server: on sending the subscribe request, or on its
    /// acknowledgement when a receipt was requested.
    fn on_subscription(&self) {}

    /// Event handler called once when the subscription is torn down locally,
    /// either through `unsubscribe` or because the session was closed. It
    /// fires regardless of the connection state.
    fn on_unsubscription(&self) {}

    /// Event handler called when the throttle rate of the subscription has
    /// been changed.
    ///
    /// # Parameters
    ///
    /// - `throttle_rate_ms`: the new minimum interval between updates; zero
    ///   means unthrottled.
    fn on_throttle_change(&self, _throttle_rate_ms: u32) {}
}

/// A subscription listener that forwards gauge updates through a tokio channel.
///
/// This is the single-consumer publish path of the library: decoded values
/// are pushed as [`GaugeUpdate`]s and the receiving side decides where and on
/// which thread to apply them.
///
/// # Examples
///
/// ```ignore
/// use gaugestream_rs::subscription::ChannelSubscriptionListener;
/// use std::sync::Arc;
///
/// let (listener, mut rx) = ChannelSubscriptionListener::create_channel();
/// subscription.add_listener(Arc::new(listener));
///
/// tokio::spawn(async move {
///     while let Some(update) = rx.recv().await {
///         println!("{} -> {:?}", update.destination, update.value);
///     }
/// });
/// ```
pub struct ChannelSubscriptionListener {
    /// Channel sender for forwarding gauge updates.
    sender: mpsc::UnboundedSender<GaugeUpdate>,
}

impl ChannelSubscriptionListener {
    /// Creates a new `ChannelSubscriptionListener` with the provided sender.
    pub fn new(sender: mpsc::UnboundedSender<GaugeUpdate>) -> Self {
        Self { sender }
    }

    /// Creates a new channel pair and returns both the listener and receiver.
    pub fn create_channel() -> (Self, mpsc::UnboundedReceiver<GaugeUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SubscriptionListener for ChannelSubscriptionListener {
    fn on_update(&self, update: &GaugeUpdate) {
        // A dropped receiver only means nobody is listening anymore
        let _ = self.sender.send(update.clone());
    }
}
