//! # Identity service boundary and change notifications
//!
//! The hosted identity service signs users in and out and reports every change
//! of the current identity. Consumers register with
//! [`IdentityService::subscribe`] and receive a [`Subscription`]: a stream of
//! [`IdentityEvent`]s that unregisters itself when dropped.
//!
//! [`IdentityBroadcaster`] is the fan-out both identity service implementations
//! use to deliver events to their subscribers.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, Stream, StreamExt};

use crate::error::IdentityError;
use crate::models::Identity;

/// A change of the current identity: `Some` after sign-in, `None` after sign-out.
pub type IdentityEvent = Option<Identity>;

/// Async interface to the hosted identity service.
pub trait IdentityService {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>>;
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>>;
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>>;
    fn update_display_name(
        &self,
        identity: &Identity,
        name: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>>;
    /// Register for identity changes. Events published after this call are
    /// delivered in order until the returned handle is dropped.
    fn subscribe(&self) -> Subscription;
    /// Resolve the persisted sign-in state and notify subscribers of it.
    fn restore(&self) -> impl Future<Output = ()>;
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    senders: Vec<(u64, UnboundedSender<IdentityEvent>)>,
}

/// Fan-out of identity events to the live subscriptions.
#[derive(Clone, Default)]
pub struct IdentityBroadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl IdentityBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with(None)
    }

    /// Subscribe and queue `initial` for the new subscriber only, so it learns
    /// the current state without waiting for the next change.
    pub fn subscribe_with(&self, initial: Option<IdentityEvent>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded();
        if let Some(event) = initial {
            let _ = sender.unbounded_send(event);
        }
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.senders.push((id, sender));
        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every live subscription.
    pub fn publish(&self, event: IdentityEvent) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .senders
            .retain(|(_, sender)| sender.unbounded_send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }
}

/// Handle to a registration with an identity service. Dropping it releases
/// the registration.
pub struct Subscription {
    id: u64,
    receiver: UnboundedReceiver<IdentityEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Take an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<IdentityEvent> {
        self.next().now_or_never().flatten()
    }
}

impl Stream for Subscription {
    type Item = IdentityEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .senders
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_delivered_in_order() {
        let broadcaster = IdentityBroadcaster::new();
        let mut sub = broadcaster.subscribe();

        broadcaster.publish(Some(Identity::new("u1", None, None)));
        broadcaster.publish(None);

        assert_eq!(sub.next().await, Some(Some(Identity::new("u1", None, None))));
        assert_eq!(sub.next().await, Some(None));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_dropping_subscription_unregisters_it() {
        let broadcaster = IdentityBroadcaster::new();
        let first = broadcaster.subscribe();
        let _second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(first);
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[test]
    fn test_initial_event_goes_to_new_subscriber_only() {
        let broadcaster = IdentityBroadcaster::new();
        let mut existing = broadcaster.subscribe();
        let mut fresh = broadcaster.subscribe_with(Some(None));

        assert_eq!(fresh.try_recv(), Some(None));
        assert_eq!(existing.try_recv(), None);
    }

    #[test]
    fn test_subscription_outliving_broadcaster() {
        let broadcaster = IdentityBroadcaster::new();
        let mut sub = broadcaster.subscribe();
        broadcaster.publish(None);
        drop(broadcaster);

        assert_eq!(sub.try_recv(), Some(None));
        assert_eq!(sub.try_recv(), None);
    }
}
