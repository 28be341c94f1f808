/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

/// Connection states, events, heartbeat tracking and session metrics.
pub mod management;

pub use management::{
    ConnectionEvent, ConnectionState, DisconnectionReason, HeartbeatConfig, HeartbeatMonitor,
    HeartbeatStatus, SessionMetrics,
};
