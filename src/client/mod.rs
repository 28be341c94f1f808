/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

mod builder;
mod frame;
mod id;
mod implementation;
mod receipt;
mod transport;

pub use builder::{DEFAULT_ACCEPT_VERSION, DEFAULT_EVENT_CAPACITY, SessionConfig};
pub use frame::{ClientFrame, ServerFrame};
pub use id::IdGenerator;
pub use implementation::Session;
pub use receipt::{Receipt, ReceiptAction, ReceiptOutcome, ReceiptTracker};
pub use transport::{ChannelTransport, CredentialProvider, StaticCredential, Transport};
