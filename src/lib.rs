//! # Gaugestream Rust Client
//!
//! This project is a Rust client engine for a multiplexed, STOMP-like publish/subscribe session that streams real-time market analytics ("gauges") for financial instruments. A single session carries many independent subscriptions over one shared transport connection, keeps them alive across reconnections, and turns the compact wire payloads into ready-to-use values.
//!
//! ## About Gauges
//!
//! A gauge is a named real-time analytic stream for a symbol. The engine understands:
//! - **Price**: last price, transmitted with a variable-length scaled encoding
//! - **Perception** and **Commitment**: scalar and long/short readings
//! - **Equilibrium**: a price band around an equilibrium price
//! - **Sentiment**: a 55-bar spectrum sent as three anchor points and expanded locally
//! - **Definitions** and **Strategy** signals for instruments
//!
//! ## Features
//!
//! - **Session Management**:
//!   - `Disconnected -> Connecting -> Connected` state machine driven by transport signals
//!   - Automatic replay of every registered subscription, with fresh ids, on each reconnection
//!   - Heartbeat liveness monitoring with configurable presets
//!   - Connection events broadcast to any number of observers
//!
//! - **Subscription Capabilities**:
//!   - Structured destinations with per-symbol stream adjustment
//!   - Throttling, changeable at any time and preserved across reconnections
//!   - Optional receipts with exactly-once acknowledged/invalidated outcomes
//!   - Lock-free access to the latest decoded value through a `watch` channel
//!
//! - **Codecs**:
//!   - Price encoding and decoding with minimal-length level selection
//!   - Catmull-Rom spectrum decompression
//!
//! - **Error Handling**:
//!   - Network conditions never surface as errors from the subscription API
//!   - Decode, routing and protocol faults are logged, counted and absorbed
//!
//! The engine owns no sockets: the transport and the credential refresher are collaborators supplied by the application.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! gaugestream-rs = "0.1.0"
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use gaugestream_rs::client::{ChannelTransport, Session, SessionConfig, StaticCredential};
//! use gaugestream_rs::connection::HeartbeatConfig;
//! use gaugestream_rs::subscription::{
//!     ChannelSubscriptionListener, Destination, GaugePath, StreamId, Subscription,
//! };
//! use std::sync::Arc;
//! use tracing::info;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     gaugestream_rs::utils::setup_logger();
//!
//!     // The transport task owns the real connection and forwards frames
//!     let (transport, mut outbound) = ChannelTransport::create_channel();
//!     let session = Session::new(
//!         SessionConfig::new().heartbeat(HeartbeatConfig::fast()),
//!         Arc::new(transport),
//!         Arc::new(StaticCredential::new("YOUR_TOKEN")),
//!     )?;
//!
//!     // Subscriptions may be registered before the connection is up
//!     let (listener, mut updates) = ChannelSubscriptionListener::create_channel();
//!     let mut subscription = Subscription::new(Destination::gauge(
//!         GaugePath::Sentiment,
//!         StreamId::Delay,
//!         "EUR.USD",
//!     ))
//!     .with_throttle_rate(500);
//!     subscription.add_listener(Arc::new(listener));
//!     let receipt = session.subscribe(&subscription, true).await?;
//!
//!     // Wire the transport: open, inbound frames, close
//!     session.on_transport_open().await;
//!     // session.handle_message(&bytes).await for every inbound frame
//!
//!     if let Some(receipt) = receipt {
//!         info!("Subscribe receipt: {:?}", receipt.outcome().await);
//!     }
//!     while let Some(update) = updates.recv().await {
//!         info!("{} -> {:?}", update.destination, update.value);
//!     }
//!
//!     session.unsubscribe(subscription.handle(), false).await?;
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ### Observing the Connection
//!
//! ```ignore
//! use gaugestream_rs::connection::ConnectionEvent;
//!
//! let mut events = session.events();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         ConnectionEvent::Disconnected { reason } => info!("Lost connection: {}", reason),
//!         ConnectionEvent::SubscriptionRestored { count } => info!("Restored {}", count),
//!         other => info!("{:?}", other),
//!     }
//! }
//! ```
//!

/// Module containing the wire codecs.
///
/// This module provides the variable-length price encoding and the sentiment
/// spectrum decompressor.
pub mod codec;

/// Module containing subscription-related functionality.
///
/// This module provides destinations, the `Subscription` descriptor, gauge
/// records and decoded values, and subscription listeners.
pub mod subscription;

/// Module containing utility functions and error types.
///
/// This module provides the error taxonomy used throughout the library and
/// the logger setup.
pub mod utils;

/// Module containing client-related functionality.
///
/// This module provides the `Session` state machine, its configuration, wire
/// frames, receipts and the transport collaborator traits.
pub mod client;

/// Module containing connection-related functionality.
///
/// This module provides connection states and events, heartbeat tracking and
/// session metrics.
pub mod connection;
