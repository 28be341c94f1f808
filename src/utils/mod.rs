/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

/// Module containing custom error types used throughout the library.
///
/// Decode, protocol and transport faults are logged and absorbed by the session;
/// only caller mistakes surface as [`SessionError`].
pub mod error;

mod logger;

pub use error::{DecodeError, ProtocolError, SessionError, TransportError};
pub use logger::{setup_logger, setup_logger_with_level};
