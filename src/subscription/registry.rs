/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Arena of live subscriptions.
//!
//! Entries are owned here and keyed by their stable handle; a second index
//! maps the current wire subscription id to the handle so that inbound
//! frames are routed in constant time.

use crate::subscription::gauge::expected_record;
use crate::subscription::{
    GaugeRecord, GaugeUpdate, GaugeValue, Subscription, SubscriptionHandle, SubscriptionListener,
};
use crate::utils::DecodeError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Runtime state of one registered subscription.
pub(crate) struct SubscriptionEntry {
    handle: SubscriptionHandle,
    destination: String,
    expected_record: &'static str,
    /// Wire id; 0 until the first subscribe request is sent
    pub(crate) subscription_id: u64,
    pub(crate) throttle_rate_ms: u32,
    /// Receipt attached to the pending subscribe request; 0 when none
    pub(crate) receipt_id: u64,
    listeners: Vec<Arc<dyn SubscriptionListener>>,
    latest: watch::Sender<Option<GaugeValue>>,
}

impl SubscriptionEntry {
    pub(crate) fn new(subscription: &Subscription) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            handle: subscription.handle(),
            destination: subscription.destination().to_string(),
            expected_record: expected_record(subscription.destination().kind()),
            subscription_id: 0,
            throttle_rate_ms: subscription.throttle_rate_ms(),
            receipt_id: 0,
            listeners: subscription.listeners().to_vec(),
            latest,
        }
    }

    #[cfg(test)]
    pub(crate) fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    pub(crate) fn destination(&self) -> &str {
        &self.destination
    }

    pub(crate) fn watch(&self) -> watch::Receiver<Option<GaugeValue>> {
        self.latest.subscribe()
    }

    /// Decodes `record` and publishes the value to the watch channel and the
    /// listeners, in that order.
    ///
    /// `Err` means the record was dropped. `Ok(Some(_))` means a value was
    /// published with substituted fields.
    pub(crate) fn apply(&self, record: GaugeRecord) -> Result<Option<DecodeError>, DecodeError> {
        if record.type_name() != self.expected_record {
            return Err(DecodeError::UnexpectedRecord {
                expected: self.expected_record,
                found: record.type_name(),
            });
        }

        let (value, error) = record.decode();
        self.latest.send_replace(Some(value.clone()));

        let update = GaugeUpdate {
            handle: self.handle,
            subscription_id: self.subscription_id,
            destination: self.destination.clone(),
            value,
        };
        for listener in &self.listeners {
            listener.on_update(&update);
        }
        Ok(error)
    }

    pub(crate) fn notify_subscribed(&self) {
        for listener in &self.listeners {
            listener.on_subscription();
        }
    }

    pub(crate) fn notify_throttle(&self) {
        for listener in &self.listeners {
            listener.on_throttle_change(self.throttle_rate_ms);
        }
    }

    /// Consumes the entry; watchers observe the channel closing.
    pub(crate) fn teardown(self) {
        for listener in &self.listeners {
            listener.on_unsubscription();
        }
    }
}

/// Subscriptions registered with a session, keyed by handle.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    entries: HashMap<SubscriptionHandle, SubscriptionEntry>,
    routes: HashMap<u64, SubscriptionHandle>,
}

impl SubscriptionRegistry {
    pub(crate) fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn insert(&mut self, entry: SubscriptionEntry) {
        if entry.subscription_id != 0 {
            self.routes.insert(entry.subscription_id, entry.handle);
        }
        self.entries.insert(entry.handle, entry);
    }

    pub(crate) fn remove(&mut self, handle: SubscriptionHandle) -> Option<SubscriptionEntry> {
        let entry = self.entries.remove(&handle)?;
        if self.routes.get(&entry.subscription_id) == Some(&handle) {
            self.routes.remove(&entry.subscription_id);
        }
        Some(entry)
    }

    pub(crate) fn get(&self, handle: SubscriptionHandle) -> Option<&SubscriptionEntry> {
        self.entries.get(&handle)
    }

    pub(crate) fn get_mut(&mut self, handle: SubscriptionHandle) -> Option<&mut SubscriptionEntry> {
        self.entries.get_mut(&handle)
    }

    /// Moves `handle` to a new wire id, dropping the route of the old one.
    pub(crate) fn assign_id(&mut self, handle: SubscriptionHandle, subscription_id: u64) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return;
        };
        if self.routes.get(&entry.subscription_id) == Some(&handle) {
            self.routes.remove(&entry.subscription_id);
        }
        entry.subscription_id = subscription_id;
        self.routes.insert(subscription_id, handle);
    }

    /// Looks up the entry currently addressed by a wire id.
    pub(crate) fn route(&self, subscription_id: u64) -> Option<&SubscriptionEntry> {
        let handle = self.routes.get(&subscription_id)?;
        self.entries.get(handle)
    }

    /// Registered handles in creation order.
    pub(crate) fn handles(&self) -> Vec<SubscriptionHandle> {
        let mut handles: Vec<_> = self.entries.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Forgets every wire id; entries keep their state until reassigned.
    pub(crate) fn clear_routes(&mut self) {
        self.routes.clear();
        for entry in self.entries.values_mut() {
            entry.subscription_id = 0;
        }
    }

    pub(crate) fn clear_receipts(&mut self) {
        for entry in self.entries.values_mut() {
            entry.receipt_id = 0;
        }
    }

    pub(crate) fn drain(&mut self) -> Vec<SubscriptionEntry> {
        self.routes.clear();
        let mut entries: Vec<_> = self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_unstable_by_key(|entry| entry.handle);
        entries
    }
}
