/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Receipt correlation.
//!
//! Every request sent with a receipt is tracked here until the server
//! acknowledges it or the session gives up on it. Exactly one terminal
//! outcome is delivered per receipt; anything arriving afterwards finds no
//! entry and is ignored.

use crate::subscription::SubscriptionHandle;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;

/// Terminal state of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// The server confirmed the request
    Acknowledged,
    /// The session disconnected or abandoned the request first
    Invalidated,
}

/// The request a pending receipt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptAction {
    /// Subscribe request of a subscription
    Subscribe(SubscriptionHandle),
    /// Unsubscribe request of a subscription
    Unsubscribe(SubscriptionHandle),
    /// Throttle change of a subscription
    Throttle(SubscriptionHandle),
    /// One-shot send
    Send,
}

/// Caller side of a receipted request.
#[derive(Debug)]
pub struct Receipt {
    id: u64,
    outcome: oneshot::Receiver<ReceiptOutcome>,
}

impl Receipt {
    /// Receipt id carried on the wire.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the terminal outcome.
    pub async fn outcome(self) -> ReceiptOutcome {
        self.outcome.await.unwrap_or(ReceiptOutcome::Invalidated)
    }

    /// Returns the outcome if it is already known.
    pub fn try_outcome(&mut self) -> Option<ReceiptOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(ReceiptOutcome::Invalidated),
        }
    }
}

#[derive(Debug)]
struct PendingReceipt {
    action: ReceiptAction,
    notify: oneshot::Sender<ReceiptOutcome>,
}

/// Pending receipts keyed by id.
#[derive(Debug, Default)]
pub struct ReceiptTracker {
    pending: DashMap<u64, PendingReceipt>,
}

impl ReceiptTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `id` and returns the caller's side.
    pub fn register(&self, id: u64, action: ReceiptAction) -> Receipt {
        let (notify, outcome) = oneshot::channel();
        self.pending.insert(id, PendingReceipt { action, notify });
        Receipt { id, outcome }
    }

    /// Completes `id` as acknowledged and returns the request it belonged to.
    ///
    /// `None` when the id is unknown or already terminal.
    pub fn acknowledge(&self, id: u64) -> Option<ReceiptAction> {
        let (_, pending) = self.pending.remove(&id)?;
        let _ = pending.notify.send(ReceiptOutcome::Acknowledged);
        Some(pending.action)
    }

    /// Completes `id` as invalidated. Returns false if it was not pending.
    pub fn invalidate(&self, id: u64) -> bool {
        match self.pending.remove(&id) {
            Some((_, pending)) => {
                let _ = pending.notify.send(ReceiptOutcome::Invalidated);
                true
            }
            None => false,
        }
    }

    /// Invalidates every pending receipt, returning how many there were.
    pub fn invalidate_all(&self) -> usize {
        let ids: Vec<u64> = self.pending.iter().map(|entry| *entry.key()).collect();
        let count = ids.into_iter().filter(|id| self.invalidate(*id)).count();
        if count > 0 {
            debug!("Invalidated {} pending receipts", count);
        }
        count
    }

    /// Whether `id` is still awaiting an outcome.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of pending receipts.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acknowledge() {
        let tracker = ReceiptTracker::new();
        let receipt = tracker.register(7, ReceiptAction::Send);
        assert!(tracker.is_pending(7));

        assert_eq!(tracker.acknowledge(7), Some(ReceiptAction::Send));
        assert!(tracker.is_empty());
        assert_eq!(receipt.outcome().await, ReceiptOutcome::Acknowledged);
    }

    #[tokio::test]
    async fn test_invalidate_then_stale_ack_is_ignored() {
        let tracker = ReceiptTracker::new();
        let mut receipt = tracker.register(3, ReceiptAction::Send);
        assert_eq!(receipt.try_outcome(), None);

        assert!(tracker.invalidate(3));
        assert_eq!(tracker.acknowledge(3), None);
        assert!(!tracker.invalidate(3));
        assert_eq!(receipt.try_outcome(), Some(ReceiptOutcome::Invalidated));
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let tracker = ReceiptTracker::new();
        let first = tracker.register(1, ReceiptAction::Send);
        let second = tracker.register(2, ReceiptAction::Send);

        assert_eq!(tracker.invalidate_all(), 2);
        assert_eq!(tracker.invalidate_all(), 0);
        assert_eq!(first.outcome().await, ReceiptOutcome::Invalidated);
        assert_eq!(second.outcome().await, ReceiptOutcome::Invalidated);
    }

    #[tokio::test]
    async fn test_dropped_tracker_invalidates() {
        let receipt = {
            let tracker = ReceiptTracker::new();
            tracker.register(1, ReceiptAction::Send)
        };
        assert_eq!(receipt.outcome().await, ReceiptOutcome::Invalidated);
    }
}
