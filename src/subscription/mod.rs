/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/
mod destination;
mod gauge;
mod listener;
mod model;
pub(crate) mod registry;
mod update;

pub use destination::{Destination, DestinationKind, GaugePath, StreamId};
pub use gauge::{GaugeRecord, GaugeValue, InstrumentDefinition, SentimentSpectrum, SpectrumTriplet};
pub use listener::{ChannelSubscriptionListener, SubscriptionListener};
pub use model::{Subscription, SubscriptionHandle};
pub use update::GaugeUpdate;
