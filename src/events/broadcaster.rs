use super::LifecycleEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Publisher-side handle for one subscriber.
///
/// With a runtime, events go through `staging` to a forwarding task that
/// owns the only path into the subscriber's queue, so delivery order equals
/// publish order. Without one, `publish` writes to `outlet` directly.
struct SubscriberEntry {
    outlet: mpsc::Sender<LifecycleEvent>,
    staging: Option<mpsc::Sender<LifecycleEvent>>,
}

struct Inner {
    subscribers: Mutex<HashMap<u64, SubscriberEntry>>,
    next_id: AtomicU64,
    capacity: usize,
    delivery_timeout: Duration,
}

/// Fans lifecycle events out to every registered subscriber.
///
/// Each subscriber owns a bounded queue fed by its own forwarding task with
/// its own delivery timeout, so a slow or broken subscriber never delays the
/// publisher or the other subscribers. Events reach each subscriber in
/// publish order. Cloning shares the subscriber set.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<Inner>,
}

/// Receiving end of one subscription.
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<LifecycleEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event; `None` once the broadcaster dropped this subscriber.
    pub async fn recv(&mut self) -> Option<LifecycleEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<LifecycleEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Move staged events into the subscriber queue one at a time. An event the
/// subscriber does not accept within `timeout` is dropped; the next one is
/// still tried.
async fn forward(
    id: u64,
    mut staging: mpsc::Receiver<LifecycleEvent>,
    outlet: mpsc::Sender<LifecycleEvent>,
    timeout: Duration,
) {
    while let Some(event) = staging.recv().await {
        match tokio::time::timeout(timeout, outlet.send(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                debug!("Subscriber {} went away", id);
                break;
            }
            Err(_) => warn!(
                "Dropped event for subscriber {}: not accepted within {:?}",
                id, timeout
            ),
        }
    }
}

impl EventBroadcaster {
    pub fn new(delivery_timeout: Duration) -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY, delivery_timeout)
    }

    pub fn with_capacity(capacity: usize, delivery_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
                delivery_timeout,
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (outlet, receiver) = mpsc::channel(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let staging = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (staging_tx, staging_rx) = mpsc::channel(self.inner.capacity);
                handle.spawn(forward(
                    id,
                    staging_rx,
                    outlet.clone(),
                    self.inner.delivery_timeout,
                ));
                Some(staging_tx)
            }
            Err(_) => None,
        };

        self.inner
            .subscribers
            .lock()
            .insert(id, SubscriberEntry { outlet, staging });
        debug!("Subscriber {} registered", id);
        Subscription { id, receiver }
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: u64) {
        if self.inner.subscribers.lock().remove(&id).is_some() {
            debug!("Subscriber {} removed", id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Queue `event` for every live subscriber and return how many accepted
    /// it. Never blocks and never fails; delivery problems are logged.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|id, entry| {
            let open = !entry.outlet.is_closed();
            if !open {
                debug!("Pruning closed subscriber {}", id);
            }
            open
        });

        let mut queued = 0;
        for (id, entry) in subscribers.iter() {
            let target = entry.staging.as_ref().unwrap_or(&entry.outlet);
            match target.try_send(event.clone()) {
                Ok(()) => queued += 1,
                Err(e) => warn!("Dropped event for subscriber {}: {}", id, e),
            }
        }
        queued
    }

    /// Drop every subscriber; their streams end after draining queued events.
    pub fn shutdown(&self) {
        let count = {
            let mut subscribers = self.inner.subscribers.lock();
            let count = subscribers.len();
            subscribers.clear();
            count
        };
        debug!("Event broadcaster shut down ({} subscribers dropped)", count);
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
