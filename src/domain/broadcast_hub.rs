//! Single fan-out point for [`HubEvent`]s.
//!
//! [`BroadcastHub`] keeps one bounded queue per subscriber. `publish` pushes
//! an event into every queue while holding the subscriber lock, so two
//! publishes can never interleave differently for two subscribers: every
//! subscriber observes the same total order.
//!
//! A subscriber whose queue is full is evicted on the spot. Its
//! [`HubSubscription`] reports [`SessionError::Backpressure`] and the owning
//! session closes. The event is still delivered to everybody else and the
//! publisher never waits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Notify, mpsc};

use super::HubEvent;
use crate::error::SessionError;

/// Default per-subscriber buffering allowance.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::Sender<Arc<HubEvent>>,
    evicted: Arc<Notify>,
}

#[derive(Debug, Default)]
struct HubInner {
    subscribers: HashMap<u64, Subscriber>,
    next_id: u64,
}

/// Broadcast hub shared by every session.
///
/// Cheap to clone; all clones publish into the same subscriber set.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    inner: Arc<Mutex<HubInner>>,
    capacity: usize,
}

impl BroadcastHub {
    /// Creates a hub where each subscriber may buffer up to `capacity`
    /// undelivered events (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        tracing::debug!(capacity, "created broadcast hub");
        Self {
            inner: Arc::new(Mutex::new(HubInner::default())),
            capacity,
        }
    }

    /// Per-subscriber buffering allowance.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a new subscriber that receives every event published from
    /// now on. Dropping the returned subscription unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> HubSubscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let evicted = Arc::new(Notify::new());
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id = id.wrapping_add(1);
            inner.subscribers.insert(
                id,
                Subscriber {
                    tx,
                    evicted: Arc::clone(&evicted),
                },
            );
            id
        };
        tracing::debug!(subscriber = id, "hub subscriber added");
        HubSubscription {
            id,
            rx,
            evicted,
            hub: Arc::clone(&self.inner),
        }
    }

    /// Delivers `event` to every current subscriber.
    ///
    /// Returns the number of subscribers that accepted the event.
    /// Subscribers with a full queue are evicted; subscribers whose
    /// receiving side is gone are dropped silently.
    pub fn publish(&self, event: HubEvent) -> usize {
        self.publish_all(vec![event])
    }

    /// Delivers `events` back to back to every current subscriber.
    ///
    /// The whole batch goes out under one lock, so no other publish can
    /// land between two events of the batch in any queue. Returns the
    /// number of subscribers that accepted every event. A subscriber that
    /// runs out of room partway through is evicted.
    pub fn publish_all(&self, events: Vec<HubEvent>) -> usize {
        let events: Vec<(&'static str, Arc<HubEvent>)> = events
            .into_iter()
            .map(|event| (event.kind_str(), Arc::new(event)))
            .collect();
        let mut inner = self.lock();
        let mut delivered = 0_usize;
        inner.subscribers.retain(|id, sub| {
            for (_, event) in &events {
                match sub.tx.try_send(Arc::clone(event)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(subscriber = id, "hub subscriber over capacity, evicting");
                        sub.evicted.notify_one();
                        return false;
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => return false,
                }
            }
            delivered = delivered.saturating_add(1);
            true
        });
        for (kind, _) in &events {
            tracing::trace!(kind, delivered, "event published");
        }
        delivered
    }

    /// Returns the current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

/// One subscriber's view of the hub.
#[derive(Debug)]
pub struct HubSubscription {
    id: u64,
    rx: mpsc::Receiver<Arc<HubEvent>>,
    evicted: Arc<Notify>,
    hub: Arc<Mutex<HubInner>>,
}

impl HubSubscription {
    /// Waits for the next event.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Backpressure`] once this subscriber has been
    /// evicted for falling behind, and [`SessionError::HubClosed`] if the
    /// hub went away.
    pub async fn recv(&mut self) -> Result<Arc<HubEvent>, SessionError> {
        tokio::select! {
            biased;
            () = self.evicted.notified() => Err(SessionError::Backpressure),
            event = self.rx.recv() => event.ok_or(SessionError::HubClosed),
        }
    }

    /// Resolves once this subscriber has been evicted.
    ///
    /// Used to abandon a write that is stuck on a slow peer.
    pub async fn evicted(&self) {
        self.evicted.notified().await;
    }

    /// Takes the next queued event without waiting.
    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<Arc<HubEvent>> {
        self.rx.try_recv().ok()
    }
}

impl Drop for HubSubscription {
    fn drop(&mut self) {
        let mut inner = self.hub.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.remove(&self.id);
    }
}
