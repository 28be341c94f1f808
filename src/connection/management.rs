/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Connection management primitives for the session.
//!
//! This module provides the connection state machine states, the events a
//! session broadcasts when the connection changes, heartbeat configuration
//! and liveness tracking, and the counters exposed for monitoring.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Current state of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection; initial state and terminal state after close
    Disconnected,
    /// Credential attached and connect frame sent
    Connecting,
    /// Connection is established and heartbeats are flowing
    Connected,
}

impl ConnectionState {
    /// Lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason for disconnection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectionReason {
    /// Network-related error occurred, including failed sends
    NetworkError(String),
    /// Server-side error occurred
    ServerError(String),
    /// Heartbeat timeout was reached
    HeartbeatTimeout,
    /// Disconnection was requested by the user
    UserRequested,
}

impl fmt::Display for DisconnectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectionReason::NetworkError(e) => write!(f, "network error: {}", e),
            DisconnectionReason::ServerError(e) => write!(f, "server error: {}", e),
            DisconnectionReason::HeartbeatTimeout => f.write_str("heartbeat timeout"),
            DisconnectionReason::UserRequested => f.write_str("user requested"),
        }
    }
}

/// Connection events that can be emitted
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Connection has been established successfully
    Connected,
    /// Connection has been lost
    Disconnected {
        /// Reason for the disconnection
        reason: DisconnectionReason,
    },
    /// A heartbeat window passed without inbound traffic
    HeartbeatMissed {
        /// Consecutive misses so far
        missed: u32,
    },
    /// Subscriptions have been preserved during disconnection
    SubscriptionPreserved {
        /// Number of subscriptions preserved
        count: usize,
    },
    /// Subscriptions have been restored after reconnection
    SubscriptionRestored {
        /// Number of subscriptions restored
        count: usize,
    },
}

/// Configuration for heartbeat monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    /// Whether heartbeat monitoring is enabled
    pub enabled: bool,
    /// Interval between heartbeat messages, also the inbound silence window
    pub interval: Duration,
    /// Maximum number of missed heartbeats before considering connection lost
    pub max_missed: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(30),
            max_missed: 3,
        }
    }
}

impl HeartbeatConfig {
    /// Creates a new heartbeat config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled heartbeat config
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a fast heartbeat config for testing
    pub fn fast() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
            max_missed: 2,
        }
    }

    /// Creates a conservative heartbeat config
    pub fn conservative() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            max_missed: 5,
        }
    }

    /// Sets whether heartbeat is enabled
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the heartbeat interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the maximum number of missed heartbeats
    #[must_use]
    pub fn with_max_missed(mut self, max_missed: u32) -> Self {
        self.max_missed = max_missed;
        self
    }

    /// Interval advertised in the connect frame; zero when disabled.
    pub fn advertised_ms(&self) -> u64 {
        if self.enabled {
            u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX)
        } else {
            0
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.interval.is_zero() {
            return Err("interval must be greater than 0".to_string());
        }

        if self.max_missed == 0 {
            return Err("max_missed must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Outcome of one heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatStatus {
    /// Traffic arrived within the window
    Alive,
    /// The window passed silently
    Missed(u32),
    /// Too many consecutive windows passed silently
    Expired,
}

/// Tracks inbound liveness of one connection.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    config: HeartbeatConfig,
    last_activity: Instant,
    missed_count: u32,
}

impl HeartbeatMonitor {
    /// Creates a new heartbeat monitor
    pub fn new(config: HeartbeatConfig) -> Self {
        Self {
            config,
            last_activity: Instant::now(),
            missed_count: 0,
        }
    }

    /// The configuration this monitor checks against.
    pub fn config(&self) -> &HeartbeatConfig {
        &self.config
    }

    /// Records inbound traffic; any frame counts.
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
        self.missed_count = 0;
    }

    /// Evaluates the silence since the last inbound frame.
    pub fn tick(&mut self) -> HeartbeatStatus {
        if self.last_activity.elapsed() <= self.config.interval {
            self.missed_count = 0;
            return HeartbeatStatus::Alive;
        }

        self.missed_count += 1;
        if self.missed_count >= self.config.max_missed {
            HeartbeatStatus::Expired
        } else {
            HeartbeatStatus::Missed(self.missed_count)
        }
    }

    /// Consecutive missed windows.
    pub fn missed_count(&self) -> u32 {
        self.missed_count
    }

    /// Time of the last inbound frame.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }
}

/// Session metrics for monitoring and debugging
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionMetrics {
    /// Number of times the connected state was entered
    pub total_connections: u64,
    /// Number of disconnections, whatever the reason
    pub disconnections: u64,
    /// Inbound frames accepted for dispatch
    pub frames_received: u64,
    /// Push frames addressed to an unknown subscription id
    pub routing_misses: u64,
    /// Wire values that could not be decoded cleanly
    pub decode_errors: u64,
    /// Unparseable or unexpected frames, including server errors
    pub protocol_faults: u64,
    /// Subscribe requests replayed on reconnection
    pub resubscriptions: u64,
    /// Number of heartbeat failures detected
    pub heartbeat_failures: u64,
}
