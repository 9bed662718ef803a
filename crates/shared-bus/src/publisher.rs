//! # Event Publisher
//!
//! The publishing side of the bus and the subscription registry behind it.

use crate::subscriber::{Delivery, EventSubscriber, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use chrono::Utc;
use parking_lot::Mutex;
use shared_types::{ConnectionEvent, MonitorEvent, MonitorEventKind, PeerId, RecordedBitswapMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Trait for feeding recorded events into the bus.
///
/// Implemented for the transport layer's ingestion path. Publishing never
/// waits on subscribers.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every current subscriber.
    ///
    /// # Returns
    ///
    /// The number of subscriptions the event was queued for.
    fn publish(&self, event: MonitorEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;

    /// Record an inbound Bitswap message, stamped with the current time.
    fn publish_bitswap_message(&self, peer: PeerId, message: RecordedBitswapMessage) -> usize {
        self.publish(MonitorEvent::bitswap_message(Utc::now(), peer, message))
    }

    /// Record a connection event, stamped with the current time.
    fn publish_connection_event(&self, peer: PeerId, event: ConnectionEvent) -> usize {
        self.publish(MonitorEvent::connection(Utc::now(), peer, event))
    }
}

/// One live subscription.
struct Slot {
    /// Distinguishes this subscription from later ones reusing the same ID.
    key: u64,
    queue: mpsc::Sender<MonitorEvent>,
    active: Arc<AtomicBool>,
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

/// In-memory subscription registry.
///
/// Each subscription gets a bounded queue drained by a dedicated Tokio task.
/// Tasks are spawned on the runtime captured at construction, so
/// [`SubscriptionRegistry::subscribe`] may be called from any thread.
pub struct SubscriptionRegistry {
    /// Live subscriptions keyed by subscriber ID.
    slots: Slots,

    /// Source of subscription keys.
    next_key: AtomicU64,

    /// Total events published.
    events_published: AtomicU64,

    /// Per-subscriber queue capacity.
    capacity: usize,

    /// Runtime delivery tasks are spawned on. `None` if the registry was
    /// built outside a runtime.
    runtime: Option<Handle>,
}

impl SubscriptionRegistry {
    /// Create a registry with default per-subscriber capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a registry with the given per-subscriber capacity.
    ///
    /// Captures the current Tokio runtime, if any.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, Handle::try_current().ok())
    }

    /// Create a registry whose delivery tasks run on `runtime`.
    #[must_use]
    pub fn with_runtime(capacity: usize, runtime: Handle) -> Self {
        Self::build(capacity, Some(runtime))
    }

    fn build(capacity: usize, runtime: Option<Handle>) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_key: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
            runtime,
        }
    }

    /// Register a subscriber under its ID.
    ///
    /// Only events published after this call are delivered.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::AlreadySubscribed`] if a live subscription
    ///   uses the same ID. The existing subscription is left untouched.
    /// - [`SubscriptionError::NoRuntime`] if no runtime was captured at
    ///   construction and the caller is not inside one either.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> Result<(), SubscriptionError> {
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| SubscriptionError::NoRuntime)?,
        };
        let id = subscriber.id().to_owned();
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let (queue, receiver) = mpsc::channel(self.capacity);
        let active = Arc::new(AtomicBool::new(true));

        {
            let mut slots = self.slots.lock();
            if slots.contains_key(&id) {
                return Err(SubscriptionError::AlreadySubscribed { id });
            }
            slots.insert(
                id.clone(),
                Slot {
                    key,
                    queue,
                    active: Arc::clone(&active),
                },
            );
        }

        info!(subscriber = %id, "Subscriber registered");

        runtime.spawn(deliver(
            subscriber,
            receiver,
            active,
            Arc::clone(&self.slots),
            key,
        ));
        Ok(())
    }

    /// Remove the subscription with this ID, if any.
    ///
    /// Safe to call repeatedly and for IDs that were never subscribed.
    pub fn unsubscribe(&self, id: &str) {
        let removed = self.slots.lock().remove(id);
        if let Some(slot) = removed {
            slot.active.store(false, Ordering::Release);
            info!(subscriber = %id, "Subscriber unregistered");
        }
    }

    /// Whether a live subscription uses this ID.
    #[must_use]
    pub fn is_subscribed(&self, id: &str) -> bool {
        self.slots.lock().contains_key(id)
    }

    /// Get the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Get the per-subscriber queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for SubscriptionRegistry {
    fn publish(&self, event: MonitorEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Enqueueing under the lock keeps the relative order of events the
        // same for every subscriber. `try_send` never waits.
        let mut queued = 0;
        let mut slots = self.slots.lock();
        slots.retain(|id, slot| match slot.queue.try_send(event.clone()) {
            Ok(()) => {
                queued += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    subscriber = %id,
                    capacity = self.capacity,
                    "Subscriber queue full, removing subscription"
                );
                slot.active.store(false, Ordering::Release);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(subscriber = %id, "Subscriber queue closed, removing subscription");
                false
            }
        });

        debug!(
            event = event.label(),
            peer = %event.peer,
            receivers = queued,
            "Event published"
        );
        queued
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

/// Drain one subscription's queue into its subscriber.
async fn deliver(
    subscriber: Arc<dyn EventSubscriber>,
    mut receiver: mpsc::Receiver<MonitorEvent>,
    active: Arc<AtomicBool>,
    slots: Slots,
    key: u64,
) {
    while let Some(event) = receiver.recv().await {
        if !active.load(Ordering::Acquire) {
            break;
        }

        let delivery = match &event.kind {
            MonitorEventKind::BitswapMessage(message) => {
                subscriber
                    .bitswap_message_received(event.timestamp, &event.peer, Arc::clone(message))
                    .await
            }
            MonitorEventKind::Connection(connection) => {
                subscriber
                    .connection_event_recorded(event.timestamp, &event.peer, connection)
                    .await
            }
        };

        if let Delivery::Terminate { reason } = delivery {
            warn!(
                subscriber = %subscriber.id(),
                reason = %reason,
                "Subscriber failed, removing subscription"
            );
            active.store(false, Ordering::Release);
            remove_if_current(&slots, subscriber.id(), key);
            return;
        }
    }

    debug!(subscriber = %subscriber.id(), "Delivery task finished");
}

/// Remove the slot for `id` only if it still belongs to subscription `key`.
fn remove_if_current(slots: &Slots, id: &str, key: u64) {
    let mut slots = slots.lock();
    if slots.get(id).is_some_and(|slot| slot.key == key) {
        slots.remove(id);
    }
}
