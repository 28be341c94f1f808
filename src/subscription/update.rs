/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use crate::subscription::SubscriptionHandle;
use crate::subscription::gauge::GaugeValue;

/// A decoded value published for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeUpdate {
    /// Stable handle of the subscription
    pub handle: SubscriptionHandle,
    /// Wire subscription id the frame was addressed to
    pub subscription_id: u64,
    /// Destination string of the subscription
    pub destination: String,
    /// Decoded value
    pub value: GaugeValue,
}
