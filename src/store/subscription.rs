//! Push-style delivery of [`ViewState`] transitions.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio_stream::Stream;

use super::ViewState;

pub type SubscriptionId = u64;

#[derive(Default)]
struct Registry {
    next_id: SubscriptionId,
    senders: Vec<(SubscriptionId, UnboundedSender<ViewState>)>,
}

/// Listener registry owned by a store.
///
/// Only the store holds the registry strongly, so the senders, and with them
/// every subscription's channel, close once the store is dropped.
///
/// Broadcasting only enqueues on unbounded channels, so it never blocks and
/// never runs subscriber code; the store can call it while holding its own
/// state lock and keep a single total order of transitions.
#[derive(Default)]
pub(crate) struct Subscribers {
    registry: Arc<Mutex<Registry>>,
}

impl Subscribers {
    /// Register a listener. `current` is delivered before any later
    /// broadcast.
    pub(crate) fn subscribe(&self, current: &ViewState) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is alive.
        let _ = tx.send(current.clone());

        let mut registry = self.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.senders.push((id, tx));

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Send `state` to every live listener, pruning closed ones.
    pub(crate) fn broadcast(&self, state: &ViewState) {
        self.lock()
            .senders
            .retain(|(_, tx)| tx.send(state.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().senders.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        lock_registry(&self.registry)
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A registered listener on a [`ProfileStore`](crate::ProfileStore).
///
/// Receives the state current at subscription time, then every transition
/// in publication order. Dropping the subscription (or calling
/// [`unsubscribe`](Subscription::unsubscribe)) removes it from the store.
///
/// Also usable as a [`Stream`] of states.
pub struct Subscription {
    id: SubscriptionId,
    rx: UnboundedReceiver<ViewState>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next state. Returns `None` once the store (every clone
    /// and every in-flight load) is gone and the buffered states are read.
    pub async fn recv(&mut self) -> Option<ViewState> {
        self.rx.recv().await
    }

    /// Next buffered state, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<ViewState> {
        match self.rx.try_recv() {
            Ok(state) => Some(state),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Every state buffered so far.
    pub fn drain(&mut self) -> Vec<ViewState> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry)
                .senders
                .retain(|(sid, _)| *sid != self.id);
        }
    }
}

impl Stream for Subscription {
    type Item = ViewState;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
