/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! The session state machine.
//!
//! A [`Session`] multiplexes every subscription over one transport
//! connection. It moves through `Disconnected -> Connecting -> Connected`
//! driven by the transport signals, replays the registered subscriptions
//! with fresh ids each time `Connected` is entered, routes push frames to
//! their subscription, correlates receipts and watches inbound liveness.
//!
//! Connection state and the subscription registry sit behind a single lock;
//! frames are handed to the transport while it is held so that requests
//! leave in the order their state changes were made. Decoded values are also
//! published to a per-subscription `watch` channel, readable without that
//! lock.

use crate::client::builder::SessionConfig;
use crate::client::frame::{ClientFrame, ServerFrame};
use crate::client::id::IdGenerator;
use crate::client::receipt::{Receipt, ReceiptAction, ReceiptTracker};
use crate::client::transport::{CredentialProvider, Transport};
use crate::connection::{
    ConnectionEvent, ConnectionState, DisconnectionReason, HeartbeatMonitor, HeartbeatStatus,
    SessionMetrics,
};
use crate::subscription::registry::{SubscriptionEntry, SubscriptionRegistry};
use crate::subscription::{Destination, GaugeRecord, GaugeValue, Subscription, SubscriptionHandle};
use crate::utils::{ProtocolError, SessionError};
use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

struct SessionInner {
    state: ConnectionState,
    registry: SubscriptionRegistry,
    heartbeat: HeartbeatMonitor,
    metrics: SessionMetrics,
    /// Bumped on every state transition out of or into `Connected`
    generation: u64,
    closed: bool,
}

/// Client side of one multiplexed pub/sub session.
///
/// Created with [`Session::new`] and shared as an `Arc`. The transport owner
/// reports connection lifecycle through [`on_transport_open`],
/// [`on_transport_closed`] and [`handle_message`]; callers manage streams
/// with [`subscribe`], [`unsubscribe`], [`throttle`] and [`send`].
///
/// None of the caller operations fail because of the network. Their outcome
/// is observable only through the optional [`Receipt`] they return.
///
/// [`on_transport_open`]: Session::on_transport_open
/// [`on_transport_closed`]: Session::on_transport_closed
/// [`handle_message`]: Session::handle_message
/// [`subscribe`]: Session::subscribe
/// [`unsubscribe`]: Session::unsubscribe
/// [`throttle`]: Session::throttle
/// [`send`]: Session::send
pub struct Session {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    inner: Mutex<SessionInner>,
    subscription_ids: IdGenerator,
    /// Never reset, so a stale receipt cannot match a newer request
    receipt_ids: IdGenerator,
    receipts: ReceiptTracker,
    events: broadcast::Sender<ConnectionEvent>,
    this: Weak<Session>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("pending_receipts", &self.receipts.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a disconnected session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Arc<Self>, SessionError> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        let inner = SessionInner {
            state: ConnectionState::Disconnected,
            registry: SubscriptionRegistry::default(),
            heartbeat: HeartbeatMonitor::new(config.heartbeat.clone()),
            metrics: SessionMetrics::default(),
            generation: 0,
            closed: false,
        };

        Ok(Arc::new_cyclic(|this| Self {
            config,
            transport,
            credentials,
            inner: Mutex::new(inner),
            subscription_ids: IdGenerator::new(),
            receipt_ids: IdGenerator::new(),
            receipts: ReceiptTracker::new(),
            events,
            this: this.clone(),
        }))
    }

    /// The transport established its connection: send CONNECT with the
    /// current credential.
    pub async fn on_transport_open(&self) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            debug!("Ignoring transport open on a closed session");
            return;
        }
        if inner.state != ConnectionState::Disconnected {
            warn!("Ignoring transport open while {}", inner.state);
            return;
        }

        inner.state = ConnectionState::Connecting;
        let frame = ClientFrame::Connect {
            credential: self.credentials.current_credential(),
            accept_version: self.config.accept_version.clone(),
            heart_beat_ms: self.config.heartbeat.advertised_ms(),
            client_id: self.config.client_id.clone(),
        };
        info!("Connecting session");
        self.send_frame(inner, frame).await;
    }

    /// The transport lost its connection.
    pub async fn on_transport_closed(&self, reason: DisconnectionReason) {
        let mut guard = self.inner.lock().await;
        self.disconnect_locked(&mut guard, reason);
    }

    /// Parses and dispatches one inbound frame.
    ///
    /// Unparseable bytes are logged, counted as a protocol fault and dropped.
    pub async fn handle_message(&self, bytes: &[u8]) {
        match ServerFrame::decode(bytes) {
            Ok(frame) => self.handle_frame(frame).await,
            Err(e) => {
                let mut guard = self.inner.lock().await;
                self.protocol_fault(&mut guard, e);
            }
        }
    }

    /// Dispatches one inbound frame.
    pub async fn handle_frame(&self, frame: ServerFrame) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            debug!("Ignoring {} frame on a closed session", frame.command());
            return;
        }

        inner.metrics.frames_received += 1;
        inner.heartbeat.record_activity();

        match frame {
            ServerFrame::Connected {
                heart_beat_ms,
                session,
            } => {
                if inner.state != ConnectionState::Connecting {
                    let state = inner.state.as_str();
                    self.protocol_fault(
                        inner,
                        ProtocolError::UnexpectedFrame {
                            frame: "CONNECTED",
                            state,
                        },
                    );
                    return;
                }
                info!(
                    "Session connected (server session: {}, server heartbeat: {} ms)",
                    session.as_deref().unwrap_or("-"),
                    heart_beat_ms
                );
                self.enter_connected(inner).await;
            }
            ServerFrame::Heartbeat => debug!("Heartbeat received"),
            ServerFrame::Receipt { receipt } => self.complete_receipt(inner, receipt),
            ServerFrame::Message { subscription, body } => {
                if inner.state != ConnectionState::Connected {
                    let state = inner.state.as_str();
                    self.protocol_fault(
                        inner,
                        ProtocolError::UnexpectedFrame {
                            frame: "MESSAGE",
                            state,
                        },
                    );
                    return;
                }
                self.route(inner, subscription, body);
            }
            ServerFrame::Error { message } => {
                self.protocol_fault(inner, ProtocolError::Server(message.clone()));
                if self.disconnect_locked(inner, DisconnectionReason::ServerError(message)) {
                    drop(guard);
                    if let Err(e) = self.transport.close().await {
                        warn!("Failed to close transport: {}", e);
                    }
                }
            }
        }
    }

    /// Registers `subscription`.
    ///
    /// A no-op returning `Ok(None)` if its handle is already registered.
    /// When connected the subscribe request is sent right away, otherwise it
    /// is sent on the next connection. A requested receipt stays pending
    /// until the server acknowledges the subscribe request, including one
    /// deferred to the next connection.
    pub async fn subscribe(
        &self,
        subscription: &Subscription,
        receipt: bool,
    ) -> Result<Option<Receipt>, SessionError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            return Err(SessionError::Closed);
        }

        let handle = subscription.handle();
        if inner.registry.contains(handle) {
            debug!("Subscription {} already registered", handle);
            return Ok(None);
        }

        let mut entry = SubscriptionEntry::new(subscription);
        let receipt = receipt.then(|| {
            let id = self.receipt_ids.next_id();
            entry.receipt_id = id;
            self.receipts.register(id, ReceiptAction::Subscribe(handle))
        });
        info!("Registering subscription {} for {}", handle, entry.destination());
        inner.registry.insert(entry);

        if inner.state == ConnectionState::Connected {
            self.send_subscribe(inner, handle).await;
        }
        Ok(receipt)
    }

    /// Removes a subscription.
    ///
    /// Local teardown happens whatever the connection state: the
    /// subscription is not replayed, its listeners get `on_unsubscription`
    /// and its watch channel closes. A still-pending subscribe receipt is
    /// invalidated.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownSubscription`] if `handle` is not registered.
    pub async fn unsubscribe(
        &self,
        handle: SubscriptionHandle,
        receipt: bool,
    ) -> Result<Option<Receipt>, SessionError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            return Err(SessionError::Closed);
        }

        let entry = inner
            .registry
            .remove(handle)
            .ok_or(SessionError::UnknownSubscription(handle))?;
        if entry.receipt_id != 0 && self.receipts.invalidate(entry.receipt_id) {
            debug!("Abandoned subscribe receipt {}", entry.receipt_id);
        }

        let (receipt_id, receipt) =
            self.request_receipt(inner.state, receipt, ReceiptAction::Unsubscribe(handle));
        if inner.state == ConnectionState::Connected {
            let frame = ClientFrame::Unsubscribe {
                id: entry.subscription_id,
                receipt: receipt_id,
            };
            self.send_frame(inner, frame).await;
        }

        info!("Unsubscribed {} from {}", handle, entry.destination());
        entry.teardown();
        Ok(receipt)
    }

    /// Changes the throttle rate of a subscription.
    ///
    /// The rate is stored locally in any state and is what the next
    /// resubscription uses; the change request is only sent when connected.
    pub async fn throttle(
        &self,
        handle: SubscriptionHandle,
        throttle_rate_ms: u32,
        receipt: bool,
    ) -> Result<Option<Receipt>, SessionError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            return Err(SessionError::Closed);
        }

        let entry = inner
            .registry
            .get_mut(handle)
            .ok_or(SessionError::UnknownSubscription(handle))?;
        entry.throttle_rate_ms = throttle_rate_ms;
        entry.notify_throttle();
        let id = entry.subscription_id;

        let (receipt_id, receipt) =
            self.request_receipt(inner.state, receipt, ReceiptAction::Throttle(handle));
        if inner.state == ConnectionState::Connected {
            let frame = ClientFrame::Throttle {
                id,
                throttle_ms: throttle_rate_ms,
                receipt: receipt_id,
            };
            self.send_frame(inner, frame).await;
        }
        Ok(receipt)
    }

    /// Sends a one-shot message to `destination`.
    ///
    /// Dropped when not connected; a requested receipt then resolves as
    /// invalidated.
    pub async fn send(
        &self,
        destination: &Destination,
        body: Bytes,
        receipt: bool,
    ) -> Result<Option<Receipt>, SessionError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            return Err(SessionError::Closed);
        }

        let (receipt_id, receipt) = self.request_receipt(inner.state, receipt, ReceiptAction::Send);
        if inner.state == ConnectionState::Connected {
            let frame = ClientFrame::Send {
                destination: destination.to_string(),
                body: body.to_vec(),
                receipt: receipt_id,
            };
            self.send_frame(inner, frame).await;
        } else {
            debug!("Dropping send to {} while {}", destination, inner.state);
        }
        Ok(receipt)
    }

    /// Terminates the session.
    ///
    /// Sends DISCONNECT when connected, invalidates every pending receipt,
    /// tears down all subscriptions and asks the transport to close. Later
    /// transport signals are ignored and caller operations fail with
    /// [`SessionError::Closed`].
    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.closed {
            return;
        }
        info!("Closing session");

        if inner.state == ConnectionState::Connected {
            let frame = ClientFrame::Disconnect { receipt: 0 };
            match frame.encode() {
                Ok(frame) => {
                    if let Err(e) = self.transport.send(frame).await {
                        debug!("Failed to send DISCONNECT frame: {}", e);
                    }
                }
                Err(e) => error!("Failed to encode DISCONNECT frame: {}", e),
            }
        }

        inner.closed = true;
        self.disconnect_locked(inner, DisconnectionReason::UserRequested);
        inner.generation += 1;
        self.receipts.invalidate_all();
        for entry in inner.registry.drain() {
            entry.teardown();
        }
        drop(guard);

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport: {}", e);
        }
    }

    /// Current connection state.
    pub async fn status(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    /// Whether [`close`](Session::close) has been called.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Wire id currently assigned to `handle`, if it has been sent.
    pub async fn subscription_id(&self, handle: SubscriptionHandle) -> Option<u64> {
        let inner = self.inner.lock().await;
        inner
            .registry
            .get(handle)
            .map(|entry| entry.subscription_id)
            .filter(|id| *id != 0)
    }

    /// Throttle rate currently stored for `handle`.
    pub async fn throttle_rate(&self, handle: SubscriptionHandle) -> Option<u32> {
        let inner = self.inner.lock().await;
        inner.registry.get(handle).map(|entry| entry.throttle_rate_ms)
    }

    /// Destination string of `handle`.
    pub async fn destination(&self, handle: SubscriptionHandle) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .registry
            .get(handle)
            .map(|entry| entry.destination().to_string())
    }

    /// Whether `handle` is registered.
    pub async fn is_registered(&self, handle: SubscriptionHandle) -> bool {
        self.inner.lock().await.registry.contains(handle)
    }

    /// Number of registered subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Receiver of the last decoded value of `handle`.
    ///
    /// The channel closes when the subscription is torn down.
    pub async fn latest(
        &self,
        handle: SubscriptionHandle,
    ) -> Option<watch::Receiver<Option<GaugeValue>>> {
        let inner = self.inner.lock().await;
        inner.registry.get(handle).map(SubscriptionEntry::watch)
    }

    /// Subscribes to connection events.
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the session counters.
    pub async fn metrics(&self) -> SessionMetrics {
        self.inner.lock().await.metrics.clone()
    }

    /// Number of receipts awaiting an outcome.
    pub fn pending_receipts(&self) -> usize {
        self.receipts.len()
    }

    fn emit(&self, event: ConnectionEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    /// Hands a frame to the transport. A failed send is a transport fault
    /// and disconnects the session; returns whether the frame left.
    async fn send_frame(&self, inner: &mut SessionInner, frame: ClientFrame) -> bool {
        let bytes = match frame.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode {} frame: {}", frame.command(), e);
                return false;
            }
        };

        match self.transport.send(bytes).await {
            Ok(()) => {
                debug!("Sent {} frame", frame.command());
                true
            }
            Err(e) => {
                warn!("Failed to send {} frame: {}", frame.command(), e);
                self.disconnect_locked(inner, DisconnectionReason::NetworkError(e.to_string()));
                false
            }
        }
    }

    /// Assigns a fresh wire id to `handle` and sends its subscribe request.
    async fn send_subscribe(&self, inner: &mut SessionInner, handle: SubscriptionHandle) -> bool {
        let id = self.subscription_ids.next_id();
        inner.registry.assign_id(handle, id);
        let Some(entry) = inner.registry.get(handle) else {
            return true;
        };

        debug!("Subscribing {} as id {} to {}", handle, id, entry.destination());
        let receipted = entry.receipt_id != 0;
        let frame = ClientFrame::Subscribe {
            destination: entry.destination().to_string(),
            id,
            throttle_ms: entry.throttle_rate_ms,
            receipt: entry.receipt_id,
        };
        if !self.send_frame(inner, frame).await {
            return false;
        }

        // Receipted requests notify on acknowledgement instead
        if !receipted {
            if let Some(entry) = inner.registry.get(handle) {
                entry.notify_subscribed();
            }
        }
        true
    }

    /// Allocates a receipt for a request that is sent now, or resolves it
    /// immediately when the request cannot be sent.
    fn request_receipt(
        &self,
        state: ConnectionState,
        wanted: bool,
        action: ReceiptAction,
    ) -> (u64, Option<Receipt>) {
        if !wanted {
            return (0, None);
        }
        let id = self.receipt_ids.next_id();
        let receipt = self.receipts.register(id, action);
        if state != ConnectionState::Connected {
            self.receipts.invalidate(id);
            return (0, Some(receipt));
        }
        (id, Some(receipt))
    }

    async fn enter_connected(&self, inner: &mut SessionInner) {
        inner.state = ConnectionState::Connected;
        inner.generation += 1;
        inner.metrics.total_connections += 1;
        let generation = inner.generation;

        self.subscription_ids.reset();
        inner.registry.clear_routes();
        self.emit(ConnectionEvent::Connected);

        let mut restored = 0;
        for handle in inner.registry.handles() {
            if !self.send_subscribe(inner, handle).await {
                return;
            }
            restored += 1;
        }
        if inner.metrics.total_connections > 1 {
            inner.metrics.resubscriptions += restored as u64;
        }
        if restored > 0 {
            info!("Restored {} subscriptions", restored);
            self.emit(ConnectionEvent::SubscriptionRestored { count: restored });
        }

        if self.config.heartbeat.enabled {
            self.spawn_heartbeat(generation);
        }
    }

    /// Moves to `Disconnected`. Returns false if already there.
    fn disconnect_locked(&self, inner: &mut SessionInner, reason: DisconnectionReason) -> bool {
        if inner.state == ConnectionState::Disconnected {
            return false;
        }
        info!("Session disconnected: {}", reason);

        inner.state = ConnectionState::Disconnected;
        inner.generation += 1;
        inner.metrics.disconnections += 1;
        self.receipts.invalidate_all();
        inner.registry.clear_receipts();
        self.emit(ConnectionEvent::Disconnected { reason });

        let count = inner.registry.len();
        if count > 0 && !inner.closed {
            debug!("Preserving {} subscriptions for the next connection", count);
            self.emit(ConnectionEvent::SubscriptionPreserved { count });
        }
        true
    }

    fn protocol_fault(&self, inner: &mut SessionInner, fault: ProtocolError) {
        warn!("Protocol fault: {}", fault);
        inner.metrics.protocol_faults += 1;
    }

    fn complete_receipt(&self, inner: &mut SessionInner, receipt: u64) {
        let Some(action) = self.receipts.acknowledge(receipt) else {
            debug!("Ignoring receipt {} with no pending request", receipt);
            return;
        };
        debug!("Receipt {} acknowledged for {:?}", receipt, action);

        if let ReceiptAction::Subscribe(handle) = action {
            if let Some(entry) = inner.registry.get_mut(handle) {
                if entry.receipt_id == receipt {
                    entry.receipt_id = 0;
                }
                entry.notify_subscribed();
            }
        }
    }

    fn route(&self, inner: &mut SessionInner, subscription_id: u64, record: GaugeRecord) {
        let Some(entry) = inner.registry.route(subscription_id) else {
            debug!(
                "Dropping update for unknown subscription id {}",
                subscription_id
            );
            inner.metrics.routing_misses += 1;
            return;
        };

        match entry.apply(record) {
            Ok(None) => {}
            Ok(Some(e)) => {
                warn!("Substituted undecodable value on {}: {}", entry.destination(), e);
                inner.metrics.decode_errors += 1;
            }
            Err(e) => {
                warn!("Dropping update on {}: {}", entry.destination(), e);
                inner.metrics.decode_errors += 1;
            }
        }
    }

    fn spawn_heartbeat(&self, generation: u64) {
        let weak = self.this.clone();
        let period = self.config.heartbeat.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(session) = weak.upgrade() else {
                    break;
                };
                if !session.heartbeat_tick(generation).await {
                    break;
                }
            }
            debug!("Heartbeat task for generation {} stopped", generation);
        });
    }

    /// One heartbeat period. Returns false once the task should stop.
    async fn heartbeat_tick(&self, generation: u64) -> bool {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.generation != generation || inner.state != ConnectionState::Connected {
            return false;
        }

        match inner.heartbeat.tick() {
            HeartbeatStatus::Alive => {}
            HeartbeatStatus::Missed(missed) => {
                warn!(
                    "No inbound traffic for {:?} ({} missed)",
                    inner.heartbeat.last_activity().elapsed(),
                    missed
                );
                self.emit(ConnectionEvent::HeartbeatMissed { missed });
            }
            HeartbeatStatus::Expired => {
                error!(
                    "Maximum missed heartbeats ({}) exceeded, disconnecting",
                    self.config.heartbeat.max_missed
                );
                inner.metrics.heartbeat_failures += 1;
                self.disconnect_locked(inner, DisconnectionReason::HeartbeatTimeout);
                drop(guard);
                if let Err(e) = self.transport.close().await {
                    warn!("Failed to close transport: {}", e);
                }
                return false;
            }
        }

        self.send_frame(inner, ClientFrame::Heartbeat).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{ChannelTransport, StaticCredential};
    use crate::connection::HeartbeatConfig;
    use crate::subscription::{GaugePath, StreamId};

    fn new_session() -> (Arc<Session>, tokio::sync::mpsc::UnboundedReceiver<Bytes>) {
        let (transport, rx) = ChannelTransport::create_channel();
        let config = SessionConfig::new().heartbeat(HeartbeatConfig::disabled());
        let session = Session::new(
            config,
            Arc::new(transport),
            Arc::new(StaticCredential::new("secret")),
        )
        .unwrap();
        (session, rx)
    }

    fn next_frame(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Bytes>) -> ClientFrame {
        ClientFrame::decode(&rx.try_recv().unwrap()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (transport, _rx) = ChannelTransport::create_channel();
        let result = Session::new(
            SessionConfig::new().event_capacity(0),
            Arc::new(transport),
            Arc::new(StaticCredential::none()),
        );
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_connect_handshake() {
        let (session, mut rx) = new_session();
        assert_eq!(session.status().await, ConnectionState::Disconnected);

        session.on_transport_open().await;
        assert_eq!(session.status().await, ConnectionState::Connecting);
        assert_eq!(
            next_frame(&mut rx),
            ClientFrame::Connect {
                credential: Some("secret".to_string()),
                accept_version: "1.2".to_string(),
                heart_beat_ms: 0,
                client_id: None,
            }
        );

        session
            .handle_frame(ServerFrame::Connected {
                heart_beat_ms: 0,
                session: Some("s-1".to_string()),
            })
            .await;
        assert_eq!(session.status().await, ConnectionState::Connected);
        assert_eq!(session.metrics().await.total_connections, 1);
    }

    #[tokio::test]
    async fn test_unexpected_connected_is_a_protocol_fault() {
        let (session, _rx) = new_session();
        session
            .handle_frame(ServerFrame::Connected {
                heart_beat_ms: 0,
                session: None,
            })
            .await;
        assert_eq!(session.status().await, ConnectionState::Disconnected);
        assert_eq!(session.metrics().await.protocol_faults, 1);
    }

    #[tokio::test]
    async fn test_malformed_and_error_frames_are_counted() {
        let (session, _rx) = new_session();
        session.handle_message(b"{broken").await;
        session
            .handle_message(br#"{"command":"ERROR","message":"bad destination"}"#)
            .await;
        let metrics = session.metrics().await;
        assert_eq!(metrics.protocol_faults, 2);
        assert_eq!(metrics.frames_received, 1);
    }

    #[tokio::test]
    async fn test_subscribe_while_disconnected_is_queued() {
        let (session, mut rx) = new_session();
        let subscription =
            Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Demo, "IBM"));
        assert!(session.subscribe(&subscription, false).await.unwrap().is_none());
        assert!(rx.try_recv().is_err());
        assert!(session.is_registered(subscription.handle()).await);
        assert_eq!(session.subscription_id(subscription.handle()).await, None);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let (session, _rx) = new_session();
        let subscription =
            Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Demo, "IBM"));
        session.close().await;
        assert!(session.is_closed().await);
        assert!(matches!(
            session.subscribe(&subscription, false).await,
            Err(SessionError::Closed)
        ));

        session.on_transport_open().await;
        assert_eq!(session.status().await, ConnectionState::Disconnected);
    }
}
