//! # Session state
//!
//! [`Session`] is the process-wide view of who is signed in. It starts out
//! `initializing` and settles on the first identity event.
//!
//! [`SessionHolder`] owns a session plus the [`Subscription`] that feeds it.
//! The UI attaches one at startup, publishes every settled session through its
//! context, and drops the holder (and with it the subscription) at teardown.

use futures::StreamExt;

use crate::identity::{IdentityEvent, IdentityService, Subscription};
use crate::models::Identity;

/// The current identity and whether the first identity event is still pending.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub initializing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            identity: None,
            initializing: true,
        }
    }
}

impl Session {
    pub fn signed(&self) -> bool {
        self.identity.is_some()
    }

    /// Apply an identity event from the identity service.
    pub fn apply(&mut self, event: IdentityEvent) {
        self.identity = event;
        self.initializing = false;
    }

    /// Optimistically replace the identity, e.g. right after registration and
    /// before the identity service reports it. The next event overrides it.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}

/// A session kept up to date by an identity service subscription.
#[derive(Debug)]
pub struct SessionHolder {
    session: Session,
    subscription: Subscription,
}

impl SessionHolder {
    /// Subscribe to `service` and start from an initializing session.
    pub fn attach(service: &impl IdentityService) -> Self {
        Self {
            session: Session::default(),
            subscription: service.subscribe(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn signed(&self) -> bool {
        self.session.signed()
    }

    pub fn initializing(&self) -> bool {
        self.session.initializing
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.session.set_identity(identity);
    }

    /// Wait for the next identity event and apply it. Returns `None` once the
    /// identity service has gone away.
    pub async fn next(&mut self) -> Option<&Session> {
        let event = self.subscription.next().await?;
        tracing::debug!(signed = event.is_some(), "identity event");
        self.session.apply(event);
        Some(&self.session)
    }

    /// Apply every event already delivered, without waiting. Returns whether
    /// the session changed.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.subscription.try_recv() {
            self.session.apply(event);
            changed = true;
        }
        changed
    }

    /// Release the subscription and keep the last session.
    pub fn detach(self) -> Session {
        self.session
    }
}
