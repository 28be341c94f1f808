/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides a small builder for the knobs a [`Session`] reads at
//! construction time, with sensible defaults for everything.
//!
//! [`Session`]: crate::client::Session

use crate::connection::HeartbeatConfig;
use crate::utils::SessionError;

/// Protocol version offered in the connect frame by default.
pub const DEFAULT_ACCEPT_VERSION: &str = "1.2";

/// Default capacity of the connection event broadcast.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Heartbeat policy
    pub heartbeat: HeartbeatConfig,
    /// Identifier of the client application, sent on connect
    pub client_id: Option<String>,
    /// Protocol version offered on connect
    pub accept_version: String,
    /// Number of connection events buffered for slow receivers
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat: HeartbeatConfig::default(),
            client_id: None,
            accept_version: DEFAULT_ACCEPT_VERSION.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the heartbeat policy.
    #[must_use]
    pub fn heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Sets the client identifier.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the protocol version offered on connect.
    #[must_use]
    pub fn accept_version(mut self, accept_version: impl Into<String>) -> Self {
        self.accept_version = accept_version.into();
        self
    }

    /// Sets the capacity of the connection event broadcast.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.heartbeat
            .validate()
            .map_err(|e| SessionError::InvalidConfig(format!("heartbeat: {}", e)))?;

        if self.accept_version.is_empty() {
            return Err(SessionError::InvalidConfig(
                "accept_version must not be empty".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(SessionError::InvalidConfig(
                "event_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.accept_version, "1.2");
        assert_eq!(config.client_id, None);
        assert_eq!(config.heartbeat, HeartbeatConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::new()
            .heartbeat(HeartbeatConfig::fast())
            .client_id("desk-7")
            .accept_version("1.1")
            .event_capacity(8);
        assert_eq!(config.heartbeat.interval, Duration::from_secs(5));
        assert_eq!(config.client_id.as_deref(), Some("desk-7"));
        assert_eq!(config.accept_version, "1.1");
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn test_validation_errors() {
        let bad_heartbeat =
            SessionConfig::new().heartbeat(HeartbeatConfig::default().with_max_missed(0));
        assert_eq!(
            bad_heartbeat.validate().unwrap_err().to_string(),
            "invalid configuration: heartbeat: max_missed must be greater than 0"
        );

        assert!(SessionConfig::new().accept_version("").validate().is_err());
        assert!(SessionConfig::new().event_capacity(0).validate().is_err());
    }
}
